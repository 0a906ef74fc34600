//! OBJ parser producing flattened position/normal buffers plus triangle and
//! wireframe index lists.
//!
//! Supported records: `v`, `vn` and triangular `f`. Every other record
//! (`vt`, `o`, `g`, `s`, `usemtl`, comments) is skipped.

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::geometry::GeometryData;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("Missing {what} on line {line}")]
    MissingComponent { line: usize, what: &'static str },
    #[error("Failed to parse {what} '{token}' on line {line}")]
    InvalidNumber {
        line: usize,
        what: &'static str,
        token: String,
    },
    #[error("Malformed face element '{token}' on line {line}")]
    MalformedCorner { line: usize, token: String },
    #[error("OBJ indices are 1-based positive integers; found {raw} on line {line}")]
    InvalidIndex { line: usize, raw: i64 },
    #[error("Face on line {line} has {corners} corners; only triangles are supported")]
    NonTriangularFace { line: usize, corners: usize },
    #[error("{what} index {index} out of range (len={len}) in '{token}' on line {line}")]
    IndexOutOfRange {
        line: usize,
        what: &'static str,
        token: String,
        index: usize,
        len: usize,
    },
    #[error("Face element '{token}' on line {line} has no normal index but the mesh declares normals")]
    MissingNormalIndex { line: usize, token: String },
    #[error("Too many vertices in OBJ (>{})", u32::MAX)]
    TooManyVertices,
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<GeometryData> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    log::info!("Loading OBJ mesh from {:?}", path);
    load_obj_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load OBJ file: {}", path.display()))
}

/// Load an OBJ mesh from any reader. The whole input is buffered first.
pub fn load_obj_from_reader<R: Read>(mut reader: R) -> Result<GeometryData> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Failed to read OBJ contents")?;
    Ok(parse_obj(&text)?)
}

/// One distinct face-corner token, resolved to 0-based indices.
#[derive(Clone, Copy, Debug)]
struct Corner<'a> {
    token: &'a str,
    line: usize,
    position: usize,
    normal: Option<usize>,
}

/// Parse OBJ text into [`GeometryData`].
///
/// Corner tokens are deduplicated by their exact text: the first occurrence
/// of `"2/9/1"` allocates a vertex, later occurrences reuse it. Indices are
/// checked once the whole text is read, so records may reference vertices
/// declared further down.
pub fn parse_obj(text: &str) -> Result<GeometryData, ObjError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut corners: Vec<Corner<'_>> = Vec::new();
    let mut unique: HashMap<&str, u32> = HashMap::new();
    let mut faces: Vec<[u32; 3]> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => positions.push(parse_vec3(&mut parts, line_no, "vertex position")?),
            "vn" => normals.push(parse_vec3(&mut parts, line_no, "vertex normal")?),
            "f" => {
                let mut face = [0u32; 3];
                let mut count = 0;
                for token in parts {
                    let index = match unique.get(token) {
                        Some(&idx) => idx,
                        None => {
                            let corner = parse_corner(token, line_no)?;
                            let idx = u32::try_from(corners.len())
                                .map_err(|_| ObjError::TooManyVertices)?;
                            corners.push(corner);
                            unique.insert(token, idx);
                            idx
                        }
                    };
                    if let Some(slot) = face.get_mut(count) {
                        *slot = index;
                    }
                    count += 1;
                }
                if count != 3 {
                    return Err(ObjError::NonTriangularFace {
                        line: line_no,
                        corners: count,
                    });
                }
                faces.push(face);
            }
            _ => {}
        }
    }

    let mut vertex_positions = Vec::with_capacity(corners.len() * 3);
    for corner in &corners {
        let p = lookup(&positions, corner.position, corner, "Position")?;
        vertex_positions.extend_from_slice(p);
    }

    // All-or-nothing: a single `vn` record means every corner needs a normal.
    let vertex_normals = if normals.is_empty() {
        None
    } else {
        let mut flat = Vec::with_capacity(corners.len() * 3);
        for corner in &corners {
            let idx = corner.normal.ok_or_else(|| ObjError::MissingNormalIndex {
                line: corner.line,
                token: corner.token.to_owned(),
            })?;
            flat.extend_from_slice(lookup(&normals, idx, corner, "Normal")?);
        }
        Some(flat)
    };

    let index_triangles: Vec<u32> = faces.iter().flatten().copied().collect();
    let index_lines = unique_edges(&faces);

    log::debug!(
        "Parsed OBJ: {} positions, {} normals, {} vertices, {} faces, {} edges",
        positions.len(),
        normals.len(),
        corners.len(),
        faces.len(),
        index_lines.len() / 2
    );

    Ok(GeometryData::new(
        vertex_positions,
        vertex_normals,
        index_triangles,
        index_lines,
    ))
}

/// Triangle edges as line-list pairs, keeping the first orientation seen.
fn unique_edges(faces: &[[u32; 3]]) -> Vec<u32> {
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut lines = Vec::new();
    for face in faces {
        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            if seen.insert((a.min(b), a.max(b))) {
                lines.push(a);
                lines.push(b);
            }
        }
    }
    lines
}

fn lookup<'t>(
    table: &'t [[f32; 3]],
    index: usize,
    corner: &Corner<'_>,
    what: &'static str,
) -> Result<&'t [f32; 3], ObjError> {
    table.get(index).ok_or_else(|| ObjError::IndexOutOfRange {
        line: corner.line,
        what,
        token: corner.token.to_owned(),
        index: index + 1,
        len: table.len(),
    })
}

fn parse_vec3<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &'static str,
) -> Result<[f32; 3], ObjError> {
    let x = parse_f32(parts.next(), line_no, what)?;
    let y = parse_f32(parts.next(), line_no, what)?;
    let z = parse_f32(parts.next(), line_no, what)?;
    Ok([x, y, z])
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &'static str) -> Result<f32, ObjError> {
    let token = value.ok_or(ObjError::MissingComponent {
        line: line_no,
        what,
    })?;
    token.parse::<f32>().map_err(|_| ObjError::InvalidNumber {
        line: line_no,
        what,
        token: token.to_owned(),
    })
}

fn parse_corner(token: &str, line_no: usize) -> Result<Corner<'_>, ObjError> {
    let malformed = || ObjError::MalformedCorner {
        line: line_no,
        token: token.to_owned(),
    };

    let mut split = token.split('/');
    let position = match split.next() {
        Some(value) if !value.is_empty() => parse_index(value, line_no, "position index")?,
        _ => return Err(malformed()),
    };
    // Texture coordinates are validated but not carried into the output.
    if let Some(value) = split.next().filter(|v| !v.is_empty()) {
        parse_index(value, line_no, "texcoord index")?;
    }
    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(parse_index(value, line_no, "normal index")?),
        _ => None,
    };
    if split.next().is_some() {
        return Err(malformed());
    }

    Ok(Corner {
        token,
        line: line_no,
        position,
        normal,
    })
}

fn parse_index(token: &str, line_no: usize, what: &'static str) -> Result<usize, ObjError> {
    let raw = token.parse::<i64>().map_err(|_| ObjError::InvalidNumber {
        line: line_no,
        what,
        token: token.to_owned(),
    })?;
    if raw < 1 {
        return Err(ObjError::InvalidIndex { line: line_no, raw });
    }
    usize::try_from(raw - 1).map_err(|_| ObjError::InvalidIndex { line: line_no, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2/1/1 3/1/1\n";

    const SQUARE: &str = r#"
        # unit square in the XY plane
        v 0.0 0.0 0.0
        v 1.0 0.0 0.0
        v 1.0 1.0 0.0
        v 0.0 1.0 0.0
        vn 0.0 0.0 1.0
        vt 0.0 0.0
        f 1/1/1 2/1/1 3/1/1
        f 1/1/1 3/1/1 4/1/1
    "#;

    fn has_edge(lines: &[u32], a: u32, b: u32) -> usize {
        lines
            .chunks(2)
            .filter(|pair| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
            .count()
    }

    #[test]
    fn parse_single_triangle() {
        let mesh = parse_obj(TRIANGLE).expect("parse triangle");
        assert_eq!(
            mesh.vertex_positions,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(mesh.vertex_normals, None);
        assert_eq!(mesh.index_triangles, vec![0, 1, 2]);
        assert_eq!(mesh.index_lines, vec![0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn shared_edge_emitted_once() {
        let mesh = parse_obj(SQUARE).expect("parse square");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_triangles, vec![0, 1, 2, 0, 2, 3]);
        // 5 unique edges: 4 sides + the diagonal.
        assert_eq!(mesh.line_count(), 5);
        assert_eq!(has_edge(&mesh.index_lines, 0, 2), 1);
        // First-seen orientation is kept: (2, 0) from the first face.
        assert_eq!(&mesh.index_lines[4..6], &[2, 0]);
    }

    #[test]
    fn repeated_tokens_share_a_vertex() {
        let mesh = parse_obj(SQUARE).expect("parse square");
        // "1/1/1" appears in both faces and maps to vertex 0 each time.
        assert_eq!(mesh.index_triangles[0], 0);
        assert_eq!(mesh.index_triangles[3], 0);
    }

    #[test]
    fn distinct_tokens_get_distinct_vertices() {
        // Same position/normal, different texcoord => separate table entries.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 1\n\
                   f 1/1 2/1 3/1\nf 1/2 3/1 2/1\n";
        let mesh = parse_obj(src).expect("parse");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_triangles, vec![0, 1, 2, 3, 2, 1]);
        assert_eq!(&mesh.vertex_positions[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn normals_follow_vertex_table() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 -1\n\
                   f 1//1 2//1 3//2\n";
        let mesh = parse_obj(src).expect("parse");
        let normals = mesh.vertex_normals.expect("normals present");
        assert_eq!(normals.len(), mesh.vertex_positions.len());
        assert_eq!(normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let a = parse_obj(SQUARE).expect("first parse");
        let b = parse_obj(SQUARE).expect("second parse");
        assert_eq!(a, b);
    }

    #[test]
    fn lines_never_contain_both_orientations() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 0 1\n\
                   f 1 2 3\nf 3 2 5\nf 1 3 4\nf 4 3 1\nf 5 4 1\n";
        let mesh = parse_obj(src).expect("parse fan");
        let mut seen = HashSet::new();
        for pair in mesh.index_lines.chunks(2) {
            let key = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            assert!(seen.insert(key), "duplicate edge {:?}", pair);
        }
        assert_eq!(mesh.index_triangles.len(), 3 * 5);
    }

    #[test]
    fn tolerates_crlf_comments_and_extra_components() {
        let src = "# exported\r\nv 0 0 0 1\r\nv 1 0 0 1\r\nv 0 1 0 1\r\n\r\no tri\r\nf 1 2 3\r\n";
        let mesh = parse_obj(src).expect("parse");
        assert_eq!(mesh.vertex_positions.len(), 9);
        assert_eq!(mesh.index_triangles, vec![0, 1, 2]);
    }

    #[test]
    fn forward_references_resolve() {
        let src = "f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n";
        let mesh = parse_obj(src).expect("parse");
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn malformed_float_is_rejected() {
        let err = parse_obj("v 0 abc 0\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::InvalidNumber { line: 1, ref token, .. } if token == "abc"
        ));
    }

    #[test]
    fn missing_coordinate_is_rejected() {
        let err = parse_obj("v 0 0\n").unwrap_err();
        assert!(matches!(err, ObjError::MissingComponent { line: 1, .. }));
    }

    #[test]
    fn malformed_index_is_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 x 1\n").unwrap_err();
        assert!(matches!(err, ObjError::InvalidNumber { line: 2, .. }));
    }

    #[test]
    fn quads_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let err = parse_obj(src).unwrap_err();
        assert_eq!(
            err,
            ObjError::NonTriangularFace {
                line: 5,
                corners: 4
            }
        );
    }

    #[test]
    fn out_of_range_position_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 7\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                line: 3,
                index: 7,
                len: 2,
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_normal_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//2\n";
        let err = parse_obj(src).unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange { what: "Normal", index: 2, len: 1, .. }
        ));
    }

    #[test]
    fn missing_normal_index_is_rejected_when_normals_exist() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3\n";
        let err = parse_obj(src).unwrap_err();
        assert!(matches!(err, ObjError::MissingNormalIndex { line: 5, .. }));
    }

    #[test]
    fn malformed_texcoord_is_rejected_even_though_unused() {
        let err = parse_obj("v 0 0 0\nf 1/t/1 1 1\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::InvalidNumber { line: 2, what: "texcoord index", .. }
        ));
        let err = parse_obj("v 0 0 0\nf 1/0 1 1\n").unwrap_err();
        assert_eq!(err, ObjError::InvalidIndex { line: 2, raw: 0 });
    }

    #[test]
    fn zero_and_negative_indices_are_rejected() {
        let err = parse_obj("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert_eq!(err, ObjError::InvalidIndex { line: 2, raw: 0 });
        let err = parse_obj("v 0 0 0\nf -1 1 1\n").unwrap_err();
        assert_eq!(err, ObjError::InvalidIndex { line: 2, raw: -1 });
    }

    #[test]
    fn empty_input_yields_empty_geometry() {
        let mesh = parse_obj("").expect("parse empty");
        assert!(!mesh.is_valid());
        assert!(mesh.vertex_normals.is_none());
    }

    #[test]
    fn reader_loader_matches_str_parser() {
        let from_reader = load_obj_from_reader(TRIANGLE.as_bytes()).expect("reader");
        assert_eq!(from_reader, parse_obj(TRIANGLE).expect("str"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_obj_from_path("does/not/exist.obj").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.obj"));
    }
}
