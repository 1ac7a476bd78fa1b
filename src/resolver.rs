// src/resolver.rs
use crate::error::ViewError;
use std::path::{Path, PathBuf};

/// Checks that `name` is a relative, slash-delimited view name that cannot
/// escape the view folder.
pub fn validate_view_name(name: &str) -> Result<(), ViewError> {
    let invalid = |reason| ViewError::InvalidViewName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid("leading or trailing '/'"));
    }
    if name.contains('\\') {
        return Err(invalid("backslashes are not allowed"));
    }
    for segment in name.split('/') {
        match segment {
            "" => return Err(invalid("empty path segment")),
            "." | ".." => return Err(invalid("relative path segment")),
            _ => {}
        }
    }
    Ok(())
}

/// Resolves view names to source files under a folder.
#[derive(Debug, Clone)]
pub struct ViewResolver {
    folder: PathBuf,
    extension: String,
}

impl ViewResolver {
    pub fn new(folder: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            extension: extension.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The path `name` maps to, whether or not it exists.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, ViewError> {
        validate_view_name(name)?;
        let mut path = self.folder.clone();
        for segment in name.split('/') {
            path.push(segment);
        }
        let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        file_name.push(&self.extension);
        path.set_file_name(file_name);
        Ok(path)
    }

    /// The path of an existing view file.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ViewError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(ViewError::NoSuchView {
                name: name.to_string(),
                path,
            });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_names_that_could_escape_the_folder() {
        for name in ["", "/abs", "dir/", "a//b", "../secret", "a/./b", "a/..", "a\\b"] {
            assert!(
                matches!(validate_view_name(name), Err(ViewError::InvalidViewName { .. })),
                "{:?} should be rejected",
                name
            );
        }
        assert!(validate_view_name("layouts/main.page").is_ok());
    }

    #[test]
    fn appends_extension_to_the_last_segment() {
        let resolver = ViewResolver::new("views", ".tpl");
        assert_eq!(
            resolver.path_for("parts/row").unwrap(),
            Path::new("views").join("parts").join("row.tpl")
        );
    }

    #[test]
    fn missing_file_is_no_such_view() {
        let resolver = ViewResolver::new("definitely/not/here", ".tpl");
        assert!(matches!(resolver.resolve("home"), Err(ViewError::NoSuchView { .. })));
    }
}
