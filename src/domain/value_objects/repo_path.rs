//! Path helpers shared by the vendor adapters.

/// Strips leading slashes so `/a.txt` and `a.txt` compare equal.
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Turns a directory path into a prefix (`docs/`), or `None` for the root.
pub fn directory_prefix(path: Option<&str>) -> Option<String> {
    let path = path?.trim();
    if path.is_empty() || path == "/" {
        return None;
    }
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{}/", trimmed))
}

/// Keeps directories under `path`, relative to it.
///
/// Root listings are returned unchanged. Entries equal to the prefix itself
/// are dropped.
pub fn relative_directories(directories: Vec<String>, path: Option<&str>) -> Vec<String> {
    match directory_prefix(path) {
        None => directories,
        Some(prefix) => directories
            .into_iter()
            .filter_map(|dir| dir.strip_prefix(&prefix).map(str::to_string))
            .filter(|dir| !dir.is_empty())
            .collect(),
    }
}

/// Percent-encodes each segment of a file path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    normalize_path(path)
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// GitLab repository name as it appears in a project path.
///
/// GitLab slugs never contain spaces; names that do are lower-cased and their
/// whitespace runs collapsed to `-`.
pub fn gitlab_repo_slug(repo: &str) -> String {
    if !repo.contains(' ') {
        return repo.to_string();
    }
    repo.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a/b.txt"), "a/b.txt");
        assert_eq!(normalize_path("a/b.txt"), "a/b.txt");
    }

    #[test]
    fn test_directory_prefix() {
        assert_eq!(directory_prefix(None), None);
        assert_eq!(directory_prefix(Some("/")), None);
        assert_eq!(directory_prefix(Some("/docs")), Some("docs/".to_string()));
        assert_eq!(directory_prefix(Some("docs/")), Some("docs/".to_string()));
    }

    #[test]
    fn test_relative_directories() {
        let dirs = vec![
            "docs".to_string(),
            "docs/api".to_string(),
            "docs/api/v1".to_string(),
            "src".to_string(),
        ];
        assert_eq!(
            relative_directories(dirs.clone(), Some("docs")),
            vec!["api".to_string(), "api/v1".to_string()]
        );
        assert_eq!(relative_directories(dirs.clone(), Some("/")), dirs);
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("/docs/my file.md"), "docs/my%20file.md");
    }

    #[test]
    fn test_gitlab_repo_slug() {
        assert_eq!(gitlab_repo_slug("widgets"), "widgets");
        assert_eq!(gitlab_repo_slug("My  Cool Repo"), "my-cool-repo");
        assert_eq!(gitlab_repo_slug("Widgets"), "Widgets");
    }
}
