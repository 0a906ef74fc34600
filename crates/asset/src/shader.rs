//! Shader source loading. Sources are kept as text; compilation happens
//! wherever the program is built.

use std::path::Path;

use anyhow::{Context, Result, bail};

/// Vertex + fragment shader pair for one program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read both stages from disk.
    pub fn load(vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> Result<Self> {
        let vertex = read_stage(vertex_path.as_ref(), "vertex")?;
        let fragment = read_stage(fragment_path.as_ref(), "fragment")?;
        Ok(Self { vertex, fragment })
    }
}

fn read_stage(path: &Path, stage: &str) -> Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} shader: {}", stage, path.display()))?;
    if source.trim().is_empty() {
        bail!("{} shader is empty: {}", stage, path.display());
    }
    log::info!("Loaded {} shader from {:?} ({} bytes)", stage, path, source.len());
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn shader_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).expect("create temp shader");
        write!(file, "{contents}").expect("write temp shader");
        file
    }

    #[test]
    fn loads_both_stages() {
        let vs = shader_file(".vert", "void main() {}");
        let fs = shader_file(".frag", "void main() { }");
        let sources = ShaderSources::load(vs.path(), fs.path()).expect("load shaders");
        assert_eq!(sources, ShaderSources::new("void main() {}", "void main() { }"));
    }

    #[test]
    fn blank_stage_is_rejected() {
        let vs = shader_file(".vert", "void main() {}");
        let fs = shader_file(".frag", "  \n");
        let err = ShaderSources::load(vs.path(), fs.path()).unwrap_err();
        assert!(err.to_string().contains("fragment shader is empty"));
    }

    #[test]
    fn missing_stage_names_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let vs = dir.path().join("nope.vert");
        let err = ShaderSources::load(&vs, dir.path().join("nope.frag")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.vert"));
    }
}
