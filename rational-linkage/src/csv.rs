//! Functions for reading/writing CSV format.
//!
//! Rows are comma separated without headers, and `#` starts a comment line.
use crate::{dq::DualQuaternion, Result};
use csv::{ReaderBuilder, Writer};
use serde::{de::DeserializeOwned, Serialize};
use std::io::Cursor;

/// Parse CSV from string.
pub fn parse_csv<D>(s: &str) -> Result<Vec<D>>
where
    D: DeserializeOwned,
{
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .from_reader(Cursor::new(s))
        .deserialize()
        .collect::<Result<_, _>>()?)
}

/// Dump CSV to string.
pub fn dump_csv<'a, C, S>(c: C) -> Result<String>
where
    C: Into<std::borrow::Cow<'a, [S]>>,
    S: Serialize + Clone + 'a,
{
    let mut w = Writer::from_writer(Vec::new());
    c.into().iter().try_for_each(|c| w.serialize(c))?;
    let buf = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse poses, eight Study parameters `p0 p1 p2 p3 d0 d1 d2 d3` per row.
pub fn parse_poses(s: &str) -> Result<Vec<DualQuaternion>> {
    Ok(parse_csv::<[f64; 8]>(s)?
        .into_iter()
        .map(DualQuaternion::from_array)
        .collect())
}

/// Parse points, three Cartesian coordinates per row.
pub fn parse_points(s: &str) -> Result<Vec<[f64; 3]>> {
    parse_csv(s)
}

#[test]
fn poses_and_points() {
    let poses = parse_poses("# identity\n1,0,0,0,0,0,0,0\n0,0,0,1,1,0,1,0\n").unwrap();
    assert_eq!(poses.len(), 2);
    assert!(poses[0].is_identity());
    let s = dump_csv(&[[1., 2., 3.], [4., 5., 6.]][..]).unwrap();
    assert_eq!(parse_points(&s).unwrap(), [[1., 2., 3.], [4., 5., 6.]]);
    assert!(parse_points("1,2\n").is_err());
}
