use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha1::Sha1;

use crate::models::Point;

type HmacSha1 = Hmac<Sha1>;

/// 地球平均半径（米）
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 米转英尺
pub const FEET_PER_METER: f64 = 3.280839895;

// 计算球面距离的函数（基于经纬度），返回米
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // 使用Haversine公式计算距离
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // 浮点误差可能让 a 略微超出 [0, 1]，对跖点时开方会得到 NaN
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// 两点之间的球面距离（英尺）
pub fn distance_in_feet(p1: Point, p2: Point) -> f64 {
    calculate_distance(p1.lat, p1.lon, p2.lat, p2.lon) * FEET_PER_METER
}

/// 当前时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC 1123 格式的 GMT 时间，用于 Date 请求头
pub fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn compute_md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

pub fn compute_hmac_base64(key: &[u8], data: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha1::new_from_slice(key)?;
    mac.update(data);
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

// VWS 签名串：method, md5(body), content-type, date, path，以换行连接
pub fn vws_string_to_sign(
    method: &str,
    content: &[u8],
    content_type: &str,
    date: &str,
    request_path: &str,
) -> String {
    [
        method.to_string(),
        compute_md5_hex(content),
        content_type.to_string(),
        date.to_string(),
        request_path.to_string(),
    ]
    .join("\n")
}

/// 生成 Vuforia Web Services 的 Authorization 头
pub fn vws_authorization_header(
    access_key: &str,
    secret_key: &str,
    method: &str,
    content: &[u8],
    content_type: &str,
    date: &str,
    request_path: &str,
) -> Result<String, InvalidLength> {
    let string_to_sign = vws_string_to_sign(method, content, content_type, date, request_path);
    let signature = compute_hmac_base64(secret_key.as_bytes(), string_to_sign.as_bytes())?;
    Ok(format!("VWS {}:{}", access_key, signature))
}

pub fn encode_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}
