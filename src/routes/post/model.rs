use crate::models::Point;

/// 解析路径中的经纬度字符串
pub fn parse_point(lat: &str, lon: &str) -> Result<Point, String> {
    let lat = parse_coordinate("lat", lat)?;
    let lon = parse_coordinate("lon", lon)?;
    Ok(Point::new(lat, lon))
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("{} is not a number: {:?}", name, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_coordinates() {
        assert_eq!(parse_point("37.0", "-122.0").unwrap(), Point::new(37.0, -122.0));
        assert_eq!(parse_point(" 1 ", "2e1").unwrap(), Point::new(1.0, 20.0));
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert!(parse_point("abc", "1").is_err());
        assert!(parse_point("1", "").is_err());
        assert!(parse_point("NaN", "1").is_err());
        assert!(parse_point("1", "inf").is_err());
    }
}
