//! Parser for the polygon subset of the well known text (WKT) geometry format.

use crate::geometry::polygon::{MultiPolygon, Polygon};
use nalgebra::{point, Point2};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "wkt/wkt_grammar.pest"]
struct WktParser;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WktError {
    #[error("Invalid WKT geometry:\n{0}")]
    Syntax(String),

    #[error("Invalid number '{0}' in WKT geometry.")]
    Number(String),

    #[error("Polygon rings need at least three distinct vertices. (found: {0})")]
    DegenerateRing(usize),
}

/// Parses a `POLYGON` or `MULTIPOLYGON`.
/// Keywords are case insensitive, z and m coordinates are accepted and dropped.
pub fn parse_geometry(input: &str) -> Result<MultiPolygon, WktError> {
    let parsed = WktParser::parse(Rule::wkt, input)
        .map_err(|e| WktError::Syntax(e.to_string()))?
        .unwrap_1();
    let (geometry, _eoi) = parsed.into_inner().unwrap_2();
    match geometry.as_rule() {
        Rule::polygon => Ok(MultiPolygon::from(parse_polygon(geometry)?)),
        Rule::multipolygon => parse_multipolygon(geometry),
        _ => unreachable!(),
    }
}

fn parse_multipolygon(pair: Pair<Rule>) -> Result<MultiPolygon, WktError> {
    assert_eq!(pair.as_rule(), Rule::multipolygon);
    let polygons = pair
        .into_inner()
        .map(parse_polygon_text)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MultiPolygon(polygons))
}

fn parse_polygon(pair: Pair<Rule>) -> Result<Polygon, WktError> {
    assert_eq!(pair.as_rule(), Rule::polygon);
    parse_polygon_text(pair.into_inner().unwrap_1())
}

fn parse_polygon_text(pair: Pair<Rule>) -> Result<Polygon, WktError> {
    assert_eq!(pair.as_rule(), Rule::polygon_text);
    let mut rings = pair.into_inner().map(parse_ring);
    let exterior = rings.unwrap_next()?;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(pair: Pair<Rule>) -> Result<Vec<Point2<f64>>, WktError> {
    assert_eq!(pair.as_rule(), Rule::ring);
    let vertices = pair
        .into_inner()
        .map(parse_coordinate)
        .collect::<Result<Vec<_>, _>>()?;

    let mut distinct = vertices.clone();
    distinct.dedup();
    if distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }
    if distinct.len() < 3 {
        return Err(WktError::DegenerateRing(distinct.len()));
    }
    Ok(vertices)
}

fn parse_coordinate(pair: Pair<Rule>) -> Result<Point2<f64>, WktError> {
    assert_eq!(pair.as_rule(), Rule::coordinate);
    let mut numbers = pair.into_inner();
    let x = parse_number(numbers.unwrap_next())?;
    let y = parse_number(numbers.unwrap_next())?;
    Ok(point![x, y])
}

fn parse_number(pair: Pair<Rule>) -> Result<f64, WktError> {
    assert_eq!(pair.as_rule(), Rule::number);
    pair.as_str()
        .parse::<f64>()
        .map_err(|_| WktError::Number(pair.as_str().to_string()))
}

trait IteratorExt: Iterator + Sized {
    fn unwrap_next(&mut self) -> Self::Item {
        self.next().unwrap()
    }

    fn unwrap_done(mut self) {
        if self.next().is_some() {
            panic!()
        }
    }

    fn unwrap_1(mut self) -> Self::Item {
        let item = self.unwrap_next();
        self.unwrap_done();
        item
    }

    fn unwrap_2(mut self) -> (Self::Item, Self::Item) {
        let item1 = self.unwrap_next();
        let item2 = self.unwrap_next();
        self.unwrap_done();
        (item1, item2)
    }
}

impl<T> IteratorExt for T where T: Iterator {}
