//! Splits a combined shader file into its stages.
//!
//! A combined file holds every stage of a program, each introduced by a
//! `#type` line:
//!
//! ```text
//! #type vertex
//! ...vertex stage...
//! #type fragment
//! ...fragment stage...
//! ```
//!
//! `pixel` is accepted as a synonym for `fragment`.

const TYPE_TOKEN: &str = "#type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "vertex" => Some(ShaderStage::Vertex),
            "fragment" | "pixel" => Some(ShaderStage::Fragment),
            _ => None,
        }
    }
}

/// Stage sources extracted from a combined shader file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

/// Split `source` at its `#type` markers.
///
/// Text before the first marker is ignored. A stage declared twice keeps its
/// last body. Both stages must be present.
pub fn preprocess(source: &str) -> Result<ShaderSources, String> {
    let mut vertex = None;
    let mut fragment = None;

    let mut current: Option<(ShaderStage, String)> = None;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(TYPE_TOKEN) {
            let keyword = rest.trim();
            let stage = ShaderStage::from_keyword(keyword)
                .ok_or_else(|| format!("invalid shader type '{keyword}'"))?;

            if let Some((stage, body)) = current.take() {
                store(stage, body, &mut vertex, &mut fragment);
            }
            current = Some((stage, String::new()));
            continue;
        }

        if let Some((_, body)) = current.as_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }

    if let Some((stage, body)) = current.take() {
        store(stage, body, &mut vertex, &mut fragment);
    }

    match (vertex, fragment) {
        (Some(vertex), Some(fragment)) => Ok(ShaderSources { vertex, fragment }),
        (None, _) => Err("missing '#type vertex' section".to_owned()),
        (_, None) => Err("missing '#type fragment' section".to_owned()),
    }
}

fn store(
    stage: ShaderStage,
    body: String,
    vertex: &mut Option<String>,
    fragment: &mut Option<String>,
) {
    let slot = match stage {
        ShaderStage::Vertex => vertex,
        ShaderStage::Fragment => fragment,
    };
    if slot.replace(body).is_some() {
        tracing::warn!("shader stage {:?} declared more than once, keeping the last one", stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_stages() {
        let source = "#type vertex\nvertex body\n#type fragment\nfragment body\n";
        let sources = preprocess(source).unwrap();
        assert_eq!(sources.vertex, "vertex body\n");
        assert_eq!(sources.fragment, "fragment body\n");
    }

    #[test]
    fn test_pixel_alias_and_crlf() {
        let source = "#type vertex\r\nv\r\n#type pixel\r\np\r\n";
        let sources = preprocess(source).unwrap();
        assert_eq!(sources.vertex.trim(), "v");
        assert_eq!(sources.fragment.trim(), "p");
    }

    #[test]
    fn test_preamble_ignored() {
        let source = "// header\n#type fragment\nf\n#type vertex\nv\n";
        let sources = preprocess(source).unwrap();
        assert_eq!(sources.vertex, "v\n");
        assert_eq!(sources.fragment, "f\n");
    }

    #[test]
    fn test_invalid_type() {
        let err = preprocess("#type geometry\nx\n").unwrap_err();
        assert!(err.contains("geometry"));
    }

    #[test]
    fn test_missing_stage() {
        assert!(preprocess("#type vertex\nv\n").is_err());
        assert!(preprocess("no markers at all").is_err());
    }

    #[test]
    fn test_duplicate_stage_keeps_last() {
        let source = "#type vertex\nold\n#type vertex\nnew\n#type fragment\nf\n";
        assert_eq!(preprocess(source).unwrap().vertex, "new\n");
    }
}
