//! Parser for `.tri` triangle-list model files.
//!
//! A file is a whitespace-separated stream of triangle records. Each record
//! is nine floats (three `x y z` vertices in winding order), optionally
//! followed by a `0xRRGGBB` diffuse colour:
//!
//! ```text
//! -1 -1 1   1 -1 1   1 1 1   0xff8000
//! -1 -1 1   1 1 1   -1 1 1
//! ```
use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use nalgebra::Vector4;
use nom::{
    bytes::complete::tag_no_case,
    character::complete::{hex_digit1, multispace0},
    combinator::opt,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::geometry::{Mesh, Triangle, DEFAULT_COLOR};

#[derive(Debug)]
pub enum TriError {
    Io { path: PathBuf, source: std::io::Error },
    /// 1-based line of the record that failed to parse.
    Parse { line: usize, message: String },
    /// NaN or infinite coordinate.
    NonFiniteCoordinate { line: usize },
    VertexCount { expected: usize, found: usize },
    Empty,
}

impl fmt::Display for TriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriError::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            TriError::Parse { line, message } => write!(f, "tri parse error at line {line}: {message}"),
            TriError::NonFiniteCoordinate { line } => {
                write!(f, "tri coordinate is not finite at line {line}")
            }
            TriError::VertexCount { expected, found } => {
                write!(f, "expected {expected} vertices, found {found}")
            }
            TriError::Empty => write!(f, "tri model has no triangles"),
        }
    }
}

impl std::error::Error for TriError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TriError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Parse the text of a `.tri` file.
pub fn parse_tri(input: &str) -> Result<Mesh, TriError> {
    let mut mesh = Mesh::new();
    let mut rest = input;

    loop {
        // multispace0 cannot fail on &str
        let (after_ws, _) = multispace0::<_, nom::error::Error<&str>>(rest).unwrap_or((rest, ""));
        if after_ws.is_empty() {
            break;
        }
        let line = line_of(input, after_ws);

        let (next, (coords, color)) = parse_record(after_ws).map_err(|e| TriError::Parse {
            line,
            message: describe_nom_error(e),
        })?;
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(TriError::NonFiniteCoordinate { line });
        }

        let color = match color {
            Some(hex) => parse_color(hex).ok_or_else(|| TriError::Parse {
                line,
                message: format!("bad colour 0x{hex}, expected six hex digits"),
            })?,
            None => DEFAULT_COLOR,
        };

        let point = |i: usize| Vector4::new(coords[i * 3], coords[i * 3 + 1], coords[i * 3 + 2], 1.0);
        let triangle = Triangle::flat(point(0), point(1), point(2), color);
        if triangle.calculate_normal().is_none() {
            warn!("degenerate triangle at line {line}, using a zero normal");
        }
        mesh.add_triangle(triangle);
        rest = next;
    }

    if mesh.triangles.is_empty() {
        return Err(TriError::Empty);
    }
    Ok(mesh)
}

/// Read and parse a `.tri` file, checking the vertex count when one is expected.
pub fn load_tri(path: impl AsRef<Path>, expected_vertices: Option<usize>) -> Result<Mesh, TriError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| TriError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_tri(&text)?;

    if let Some(expected) = expected_vertices {
        if mesh.vertex_count() != expected {
            return Err(TriError::VertexCount {
                expected,
                found: mesh.vertex_count(),
            });
        }
    }

    info!(
        "loaded {} model with {} vertices and {:7.2} bounding radius",
        path.display(),
        mesh.vertex_count(),
        mesh.bounding_radius()
    );
    Ok(mesh)
}

fn parse_record(input: &str) -> IResult<&str, ([f32; 9], Option<&str>)> {
    let mut coords = [0.0_f32; 9];
    let mut input = input;
    for c in coords.iter_mut() {
        let (next, value) = preceded(multispace0, float)(input)?;
        *c = value;
        input = next;
    }
    let (input, color) = opt(preceded(multispace0, preceded(tag_no_case("0x"), hex_digit1)))(input)?;
    Ok((input, (coords, color)))
}

fn parse_color(hex: &str) -> Option<[f32; 4]> {
    if hex.len() != 6 {
        return None;
    }
    let rgb = u32::from_str_radix(hex, 16).ok()?;
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    Some([channel(16), channel(8), channel(0), 1.0])
}

fn line_of(full: &str, rest: &str) -> usize {
    let consumed = full.len() - rest.len();
    full[..consumed].matches('\n').count() + 1
}

fn describe_nom_error(e: nom::Err<nom::error::Error<&str>>) -> String {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let near: String = e.input.chars().take(16).collect();
            if near.is_empty() {
                "unexpected end of file inside a triangle".to_string()
            } else {
                format!("expected a number near {near:?}")
            }
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}
