//! Reader for the whitespace-delimited `.m3d` text mesh format.
//!
//! Layout:
//!
//! ```text
//! <header>
//! #Subsets n  #Vertices n  #Triangles n
//! <subsets header>
//! diffuse spec normal <label> rx ry rz          (n subsets)
//! <vertices header>
//! Position: x y z Tangent: x y z Normal: x y z Tex-Coords: u v   (n vertices)
//! <triangles header>
//! i0 i1 i2 attribute                            (n triangles)
//! ```
//!
//! The three count keywords must match exactly; the section headers and
//! the reflectivity label are skipped without being checked.

use std::ops::Range;
use std::str::{FromStr, SplitWhitespace};

use seasons_core::{Result, SeasonsError};

use crate::primitives::MeshVertex;

/// Material of one subset
#[derive(Debug, Clone, PartialEq)]
pub struct M3dSubset {
    pub diffuse_map: String,
    pub spec_map: String,
    pub normal_map: String,
    pub reflectivity: [f32; 3],
}

/// Parsed mesh before upload
#[derive(Debug, Clone, PartialEq)]
pub struct M3dData {
    pub subsets: Vec<M3dSubset>,
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<[u32; 3]>,
    /// Subset index of each triangle
    pub attributes: Vec<u32>,
}

/// Index list grouped by subset
#[derive(Debug, Clone, PartialEq)]
pub struct SortedIndices {
    pub indices: Vec<u32>,
    /// Index range of each subset, in subset order
    pub ranges: Vec<Range<u32>>,
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &str) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| SeasonsError::ParseError(format!("unexpected end of file, expected {what}")))
    }

    fn skip(&mut self, what: &str) -> Result<()> {
        self.next(what).map(|_| ())
    }

    fn keyword(&mut self, expected: &str) -> Result<()> {
        let token = self.next(expected)?;
        if token != expected {
            return Err(SeasonsError::ParseError(format!(
                "expected '{expected}', found '{token}'"
            )));
        }
        Ok(())
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| SeasonsError::ParseError(format!("expected {what}, found '{token}'")))
    }

    fn vec3(&mut self, what: &str) -> Result<[f32; 3]> {
        Ok([self.parse(what)?, self.parse(what)?, self.parse(what)?])
    }

    fn vec2(&mut self, what: &str) -> Result<[f32; 2]> {
        Ok([self.parse(what)?, self.parse(what)?])
    }
}

/// Parse an m3d document and validate its indices and attributes
pub fn parse_m3d(source: &str) -> Result<M3dData> {
    let mut t = Tokens {
        inner: source.split_whitespace(),
    };

    t.skip("file header")?;
    t.keyword("#Subsets")?;
    let subset_count: usize = t.parse("subset count")?;
    t.keyword("#Vertices")?;
    let vertex_count: usize = t.parse("vertex count")?;
    t.keyword("#Triangles")?;
    let triangle_count: usize = t.parse("triangle count")?;

    t.skip("subsets header")?;
    let mut subsets = Vec::with_capacity(subset_count);
    for _ in 0..subset_count {
        let diffuse_map = t.next("diffuse map")?.to_string();
        let spec_map = t.next("specular map")?.to_string();
        let normal_map = t.next("normal map")?.to_string();
        t.skip("reflectivity label")?;
        let reflectivity = t.vec3("reflectivity")?;
        subsets.push(M3dSubset {
            diffuse_map,
            spec_map,
            normal_map,
            reflectivity,
        });
    }

    t.skip("vertices header")?;
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        t.skip("Position:")?;
        let pos = t.vec3("position")?;
        t.skip("Tangent:")?;
        let tangent = t.vec3("tangent")?;
        t.skip("Normal:")?;
        let normal = t.vec3("normal")?;
        t.skip("Tex-Coords:")?;
        let tex_c = t.vec2("texture coordinate")?;
        vertices.push(MeshVertex {
            pos,
            tangent,
            normal,
            tex_c,
        });
    }

    t.skip("triangles header")?;
    let mut triangles = Vec::with_capacity(triangle_count);
    let mut attributes = Vec::with_capacity(triangle_count);
    for n in 0..triangle_count {
        let tri: [u32; 3] = [t.parse("index")?, t.parse("index")?, t.parse("index")?];
        let attribute: u32 = t.parse("subset attribute")?;

        if let Some(&bad) = tri.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SeasonsError::ParseError(format!(
                "triangle {n} references vertex {bad} but there are {vertex_count} vertices"
            )));
        }
        if attribute as usize >= subset_count {
            return Err(SeasonsError::ParseError(format!(
                "triangle {n} uses subset {attribute} but there are {subset_count} subsets"
            )));
        }
        triangles.push(tri);
        attributes.push(attribute);
    }

    Ok(M3dData {
        subsets,
        vertices,
        triangles,
        attributes,
    })
}

impl M3dData {
    /// Sort triangles by subset so each subset draws as one contiguous range.
    /// Triangle order inside a subset is preserved.
    pub fn sorted_indices(&self) -> SortedIndices {
        let mut order: Vec<usize> = (0..self.triangles.len()).collect();
        order.sort_by_key(|&i| self.attributes[i]);

        let mut indices = Vec::with_capacity(self.triangles.len() * 3);
        let mut ranges = vec![0..0; self.subsets.len()];
        for &tri in &order {
            let subset = self.attributes[tri] as usize;
            let start = indices.len() as u32;
            indices.extend_from_slice(&self.triangles[tri]);
            let range = &mut ranges[subset];
            if range.start == range.end {
                *range = start..start + 3;
            } else {
                range.end = start + 3;
            }
        }

        SortedIndices { indices, ranges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
***************m3d-File-Header***************
#Subsets 2
#Vertices 4
#Triangles 3

***************SubsetInfo*********************
bark.png bark_spec.png bark_nmap.png Reflectivity: 0 0 0
leaf.png leaf_spec.png leaf_nmap.png Reflectivity: 0.1 0.1 0.1

***************Vertices***********************
Position: 0 0 0 Tangent: 1 0 0 Normal: 0 1 0 Tex-Coords: 0 0
Position: 1 0 0 Tangent: 1 0 0 Normal: 0 1 0 Tex-Coords: 1 0
Position: 1 0 1 Tangent: 1 0 0 Normal: 0 1 0 Tex-Coords: 1 1
Position: 0 0 1 Tangent: 1 0 0 Normal: 0 1 0 Tex-Coords: 0 1

***************Triangles**********************
0 1 2 1
0 2 3 0
2 1 0 1
";

    #[test]
    fn parses_counts_and_materials() {
        let data = parse_m3d(QUAD).unwrap();
        assert_eq!(data.subsets.len(), 2);
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.triangles.len(), 3);
        assert_eq!(data.subsets[1].diffuse_map, "leaf.png");
        assert_eq!(data.subsets[1].normal_map, "leaf_nmap.png");
        assert_eq!(data.subsets[1].reflectivity, [0.1, 0.1, 0.1]);
        assert_eq!(data.vertices[2].pos, [1.0, 0.0, 1.0]);
        assert_eq!(data.vertices[3].tex_c, [0.0, 1.0]);
    }

    #[test]
    fn triangles_are_grouped_by_subset() {
        let sorted = parse_m3d(QUAD).unwrap().sorted_indices();
        assert_eq!(sorted.indices, vec![0, 2, 3, 0, 1, 2, 2, 1, 0]);
        assert_eq!(sorted.ranges, vec![0..3, 3..9]);
    }

    #[test]
    fn unused_subset_gets_empty_range() {
        let src = QUAD.replace("0 2 3 0", "0 2 3 1");
        let sorted = parse_m3d(&src).unwrap().sorted_indices();
        assert_eq!(sorted.ranges[0], 0..0);
        assert_eq!(sorted.ranges[1], 0..9);
    }

    #[test]
    fn out_of_range_attribute_is_rejected() {
        let src = QUAD.replace("2 1 0 1", "2 1 0 5");
        let err = parse_m3d(&src).unwrap_err();
        assert!(err.to_string().contains("subset 5"));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let src = QUAD.replace("0 2 3 0", "0 2 9 0");
        assert!(parse_m3d(&src).is_err());
    }

    #[test]
    fn truncated_file_is_rejected() {
        let cut = &QUAD[..QUAD.find("Position: 1 0 1").unwrap()];
        let err = parse_m3d(cut).unwrap_err();
        assert!(err.to_string().contains("end of file"));
    }

    #[test]
    fn count_keywords_must_match() {
        let src = QUAD.replace("#Vertices 4", "#Verts 4");
        let err = parse_m3d(&src).unwrap_err();
        assert!(err.to_string().contains("expected '#Vertices', found '#Verts'"));

        let src = QUAD.replace("#Triangles 3", "#Subsets 3");
        assert!(parse_m3d(&src).is_err());
    }

    #[test]
    fn bad_number_is_rejected() {
        let src = QUAD.replace("#Vertices 4", "#Vertices four");
        assert!(parse_m3d(&src).is_err());
    }
}
