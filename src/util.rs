use std::path::{Path, PathBuf};

/// an absolute path rooted at this crate's manifest directory
pub fn manifest_path<I, P>(segments: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.extend(segments);
    path
}

pub fn relative_path<I, P>(segments: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    segments.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_path_is_rooted_at_the_crate() {
        let path = manifest_path(["shaders", "source"]);

        assert!(path.is_absolute());
        assert!(path.ends_with("shaders/source"));
        assert!(path.is_dir());
    }

    #[test]
    fn relative_path_joins_segments() {
        let path = relative_path(["generated", "shader_atlas.rs"]);

        assert_eq!(path, Path::new("generated").join("shader_atlas.rs"));
        assert!(path.is_relative());
    }
}
