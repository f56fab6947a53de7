//! List command - enumerate registered hooks

use addonkit_hooks::Registry;

use crate::error::Result;

/// Run the list command
pub fn run(registry: &Registry) -> Result<()> {
    print!("{}", render(registry));
    Ok(())
}

/// One line per hook: index, name, declared path
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    for (index, hook) in registry.hooks().iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {}  ({})\n",
            index, hook.metadata.name, hook.metadata.path
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use addonkit_core::HookConfig;
    use addonkit_hooks::{Hook, HookMetadata};

    #[test]
    fn test_render_lists_hooks_in_order() {
        let mut registry = Registry::new();
        registry.add(Hook::from_fn(
            HookMetadata::new("alpha", "hooks/alpha.rs"),
            HookConfig {
                on_startup: Some(1),
                ..Default::default()
            },
            |_| Ok(()),
        ));
        registry.add(Hook::from_fn(
            HookMetadata::new("beta", "hooks/beta.rs"),
            HookConfig {
                on_startup: Some(2),
                ..Default::default()
            },
            |_| Ok(()),
        ));

        let rendered = render(&registry);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("0"));
        assert!(lines[0].contains("alpha"));
        assert!(lines[1].contains("beta"));
        assert!(lines[1].contains("hooks/beta.rs"));
    }

    #[test]
    fn test_render_empty_registry() {
        assert!(render(&Registry::new()).is_empty());
    }
}
