use crate::codec::{strip_terminator, to_string};
use crate::constants::{
    CMD_GET_PARAMETER, CMD_GET_VERSION, N_PARAMETER_LINES, N_VERSION_LINES, STATUS_OK,
};
use crate::error::UrgError;
use crate::response::validate_response;
use urg_data::parameters::{
    KEY_ANGULAR_RESOLUTION, KEY_FRONT_INDEX, KEY_MAX_DISTANCE, KEY_MAX_INDEX, KEY_MIN_DISTANCE,
    KEY_MIN_INDEX, KEY_ROTATION_SPEED,
};
use urg_data::{ParameterMap, ScanGeometry, VersionInfo};

/// Parse the response to `PP` into a parameter map.
pub(crate) fn parse_parameters(block: &[Vec<u8>]) -> Result<ParameterMap, UrgError> {
    validate_response(block, CMD_GET_PARAMETER, &[STATUS_OK])?;
    let mut parameters = ParameterMap::new();
    for line in block.iter().skip(2).take(N_PARAMETER_LINES) {
        let (key, value) = split_key_value(line)?;
        parameters.insert(key, value);
    }
    Ok(parameters)
}

/// Parse the response to `VV`.
pub(crate) fn parse_version(block: &[Vec<u8>]) -> Result<VersionInfo, UrgError> {
    validate_response(block, CMD_GET_VERSION, &[STATUS_OK])?;
    let mut info = VersionInfo::default();
    for line in block.iter().skip(2).take(N_VERSION_LINES) {
        let (key, value) = split_key_value(line)?;
        match key.as_str() {
            "VEND" => info.vendor = value,
            "PROD" => info.product = value,
            "FIRM" => info.firmware = value,
            "PROT" => info.protocol = value,
            "SERI" => info.serial_number = value,
            _ => (),
        }
    }
    Ok(info)
}

/// Build the scan geometry from the parameters a device reported.
pub fn geometry_from(parameters: &ParameterMap) -> Result<ScanGeometry, UrgError> {
    let geometry = ScanGeometry {
        min_index: required(parameters, KEY_MIN_INDEX)?,
        max_index: required(parameters, KEY_MAX_INDEX)?,
        front_index: required(parameters, KEY_FRONT_INDEX)?,
        angular_resolution: required(parameters, KEY_ANGULAR_RESOLUTION)?,
        rotation_rpm: required(parameters, KEY_ROTATION_SPEED)?,
        min_distance: optional(parameters, KEY_MIN_DISTANCE)?,
        max_distance: optional(parameters, KEY_MAX_DISTANCE)?,
    };

    if geometry.angular_resolution == 0 {
        return Err(invalid(KEY_ANGULAR_RESOLUTION, "0"));
    }
    if geometry.rotation_rpm == 0 {
        return Err(invalid(KEY_ROTATION_SPEED, "0"));
    }
    if geometry.min_index > geometry.max_index {
        return Err(invalid(KEY_MIN_INDEX, &geometry.min_index.to_string()));
    }
    Ok(geometry)
}

// "KEY:VALUE;SUM\n" -> ("KEY", "VALUE")
fn split_key_value(line: &[u8]) -> Result<(String, String), UrgError> {
    let text = String::from_utf8_lossy(strip_terminator(line));
    let mut fields = text.split(|c: char| c == ':' || c == ';');
    match (fields.next(), fields.next()) {
        (Some(key), Some(value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(UrgError::InvalidParameterLine(to_string(line))),
    }
}

fn required(parameters: &ParameterMap, key: &str) -> Result<u32, UrgError> {
    optional(parameters, key)?.ok_or_else(|| UrgError::MissingParameter(key.to_string()))
}

fn optional(parameters: &ParameterMap, key: &str) -> Result<Option<u32>, UrgError> {
    match parameters.get(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> UrgError {
    UrgError::InvalidParameter(key.to_string(), value.to_string())
}
