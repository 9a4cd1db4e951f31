//! STL file parser for binary and ASCII formats
use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::Mesh;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

type Facet = [Point3<f32>; 3];

fn mesh_from_facets(facets: impl IntoIterator<Item = Facet>, capacity: usize) -> Mesh {
    let mut mesh = Mesh::with_capacity(capacity * 3, capacity);
    for [a, b, c] in facets {
        mesh.add_triangle(a, b, c);
    }
    mesh
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn read_point(data: &[u8], offset: usize) -> Point3<f32> {
    Point3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let body = &data[HEADER_LEN + 4..];
    let available = body.len() / FACET_LEN;
    if available < count {
        return Err(StlError::Truncated {
            expected: count,
            parsed: available,
        });
    }

    // Each facet: normal (ignored), 3 vertices, 2-byte attribute count
    let facets = body.chunks_exact(FACET_LEN).take(count).map(|facet| {
        [
            read_point(facet, 12),
            read_point(facet, 24),
            read_point(facet, 36),
        ]
    });
    Ok(mesh_from_facets(facets, count))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match parse_solid(input) {
        Ok((_, facets)) => {
            let count = facets.len();
            Ok(mesh_from_facets(facets, count))
        }
        Err(e) => Err(StlError::Ascii(e.to_string())),
    }
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_point(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (a, b, c)) = tuple((parse_vertex, parse_vertex, parse_vertex))(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;
    Ok((input, [a, b, c]))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    preceded(preceded(multispace0, tag("vertex")), parse_point)(input)
}

fn parse_point(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, x) = preceded(multispace0, float)(input)?;
    let (input, y) = preceded(multispace1, float)(input)?;
    let (input, z) = preceded(multispace1, float)(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(mesh) = std::str::from_utf8(data)
            .map_err(|e| StlError::Ascii(e.to_string()))
            .and_then(parse_ascii_stl)
        {
            return Ok(mesh);
        }
    }
    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshSource;

    const TRIANGLE: &str = "solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1.5 -2e-1
    endloop
  endfacet
endsolid tri
";

    fn binary(facets: &[[f32; 9]], declared: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&declared.to_le_bytes());
        for facet in facets {
            data.extend_from_slice(&[0u8; 12]);
            for v in facet {
                data.extend_from_slice(&v.to_le_bytes());
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let mesh = parse_binary_stl(&binary(&[], 0)).unwrap();
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(parse_binary_stl(&[0u8; 10]), Err(StlError::TooSmall(10)));
    }

    #[test]
    fn test_parse_binary_facets() {
        let data = binary(&[[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]; 2], 2);
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.vertex(4), Some(Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_parse_binary_truncated() {
        let data = binary(&[[0.0; 9]], 3);
        assert_eq!(
            parse_binary_stl(&data),
            Err(StlError::Truncated { expected: 3, parsed: 1 })
        );
    }

    #[test]
    fn test_parse_ascii_named_solid() {
        let mesh = parse_stl(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.polygon(0), &[0, 1, 2]);
        assert_eq!(mesh.vertex(2), Some(Point3::new(0.0, 1.5, -0.2)));
    }

    #[test]
    fn test_parse_ascii_rejects_garbage() {
        assert!(matches!(parse_ascii_stl("solid x\n facet oops"), Err(StlError::Ascii(_))));
    }
}
