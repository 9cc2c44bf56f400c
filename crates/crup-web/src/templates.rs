//! Page templates, compiled into the binary.

use minijinja::Environment;

const BASE_HTML: &str = include_str!("../templates/base.html");
const INDEX_HTML: &str = include_str!("../templates/index.html");
const MACROS_HTML: &str = include_str!("../templates/macros.html");

/// Build the template environment. `.html` templates are auto-escaped.
pub fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    for (name, source) in [
        ("base.html", BASE_HTML),
        ("macros.html", MACROS_HTML),
        ("index.html", INDEX_HTML),
    ] {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!(template = name, error = %e, "Template failed to compile");
        }
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_compile() {
        let env = environment();
        for name in ["base.html", "macros.html", "index.html"] {
            assert!(env.get_template(name).is_ok(), "{name} missing");
        }
    }
}
