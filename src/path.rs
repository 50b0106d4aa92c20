/// Root segment applied to every path sent to the provider and stripped
/// from every path it returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPrefix {
    prefix: Option<String>,
}

impl PathPrefix {
    pub fn new(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self { prefix }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Absolute provider path for a caller path, e.g. `a/b` -> `/prefix/a/b`.
    pub fn apply(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        match (&self.prefix, path.is_empty()) {
            (Some(prefix), true) => format!("/{}", prefix),
            (Some(prefix), false) => format!("/{}/{}", prefix, path),
            (None, _) => format!("/{}", path),
        }
    }

    /// Caller path for a provider path. The provider is case-insensitive and
    /// may report the prefix with a different case than configured.
    pub fn strip(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        let Some(prefix) = &self.prefix else {
            return path.to_string();
        };

        // Compared segment by segment so `prefixed/...` is not inside `prefix`
        let depth = prefix.split('/').count();
        let mut segments = path.splitn(depth + 1, '/');
        let inside = prefix.split('/').all(|expected| match segments.next() {
            Some(segment) => segment.to_lowercase() == expected.to_lowercase(),
            None => false,
        });

        if inside {
            segments.next().unwrap_or("").trim_start_matches('/').to_string()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let prefix = PathPrefix::new(Some("prefix"));
        assert_eq!(prefix.apply("something"), "/prefix/something");
        assert_eq!(prefix.apply("/pass/please/"), "/prefix/pass/please");
        assert_eq!(prefix.apply(""), "/prefix");

        let bare = PathPrefix::new(None);
        assert_eq!(bare.apply("one"), "/one");
        assert_eq!(bare.apply(""), "/");

        // Surrounding slashes and empty prefixes are normalized away
        assert_eq!(PathPrefix::new(Some("/prefix/")), prefix);
        assert_eq!(PathPrefix::new(Some("/")), bare);
        assert_eq!(PathPrefix::new(Some("")).as_str(), None);
    }

    #[test]
    fn test_strip() {
        let prefix = PathPrefix::new(Some("prefix"));
        assert_eq!(prefix.strip("/prefix/pass/please"), "pass/please");
        assert_eq!(prefix.strip("/Prefix/Mixed/Case"), "Mixed/Case");
        assert_eq!(prefix.strip("/prefix"), "");
        assert_eq!(prefix.strip("dirname/file"), "dirname/file");
        assert_eq!(prefix.strip("/prefixed/file"), "prefixed/file");
        assert_eq!(prefix.strip("/pre/fix"), "pre/fix");

        let unicode = PathPrefix::new(Some("Ünterlagen/Été"));
        assert_eq!(unicode.strip("/ünterlagen/été/bericht.pdf"), "bericht.pdf");
        assert_eq!(unicode.strip("/ÜNTERLAGEN/ÉTÉ"), "");
        assert_eq!(unicode.strip("/ünterlagen/other"), "ünterlagen/other");

        let bare = PathPrefix::new(None);
        assert_eq!(bare.strip("/one"), "one");
    }

    #[test]
    fn test_round_trip() {
        let prefixes = [None, Some("prefix"), Some("a/b"), Some("/nested/root/")];
        let paths = ["", "one", "dir/file.txt", "prefix", "a/b/c", "ü/ñ"];

        for prefix in prefixes {
            let prefix = PathPrefix::new(prefix);
            for path in paths {
                assert_eq!(
                    prefix.strip(&prefix.apply(path)),
                    path,
                    "prefix {:?}, path {:?}",
                    prefix,
                    path
                );
            }
        }
    }
}
