/// Derive a URL-safe slug from a project name.
///
/// Lowercases and trims, drops everything outside `[a-z0-9]`, whitespace, `_` and `-`,
/// turns each run of whitespace/underscores into one hyphen and strips leading and
/// trailing hyphens. Applying it to its own output is a no-op.
///
/// A name with no ASCII letters or digits (e.g. `"!!!"`) yields an empty slug, so an
/// owner can have only one such project; later ones collide on the slug.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
            in_separator = false;
        } else if c.is_whitespace() || c == '_' {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        }
    }

    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_examples() {
        assert_eq!(slugify("My Project"), "my-project");
        assert_eq!(slugify("  Hello   World  "), "hello-world");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
        assert_eq!(slugify("Proyecto Ñandú!"), "proyecto-and");
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("v2.0 release"), "v20-release");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_names_collide_after_normalization() {
        assert_eq!(slugify("My Project"), slugify("my_project"));
        assert_eq!(slugify("My Project"), slugify("  MY   PROJECT "));
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(name in "\\PC{0,64}") {
            let once = slugify(&name);
            prop_assert_eq!(slugify(&once), once.clone());
        }

        #[test]
        fn slugify_output_is_url_safe(name in "\\PC{0,64}") {
            let slug = slugify(&name);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }
}
