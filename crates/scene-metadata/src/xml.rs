//! WorldView-style XML sidecar parser.
//!
//! A sidecar carries an `IMD` block (image size and acquisition) and an `RPB`
//! block (the RPC camera). Elements are addressed by their path below the
//! document root, e.g. `IMD/IMAGE/CLOUDCOVER`.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use projection::{RpcModel, RPC_COEFFICIENTS};
use quick_xml::events::Event;
use quick_xml::Reader;
use tile_common::{parse_capture_time, Result, TilerError};
use tracing::debug;

use crate::record::ImageMetadata;

/// Parse the XML sidecar at `path`.
pub fn parse_metadata(path: &Path) -> Result<ImageMetadata> {
    let xml = fs::read_to_string(path).map_err(|e| TilerError::io(path, e))?;

    let metadata = parse_metadata_str(&xml).map_err(|e| match e {
        TilerError::Data(msg) => TilerError::Data(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    debug!(
        path = %path.display(),
        width = metadata.width,
        height = metadata.height,
        cloud_cover = metadata.cloud_cover,
        capture_time = %metadata.capture_time,
        "Parsed scene metadata"
    );
    Ok(metadata)
}

/// Parse sidecar XML held in memory.
pub fn parse_metadata_str(xml: &str) -> Result<ImageMetadata> {
    let fields = Fields::collect(xml)?;

    let width: u32 = fields.parse("IMD/NUMCOLUMNS")?;
    let height: u32 = fields.parse("IMD/NUMROWS")?;
    if width == 0 || height == 0 {
        return Err(TilerError::Data(format!(
            "image size must be positive, got {}x{}",
            width, height
        )));
    }

    let cloud_cover: f64 = fields.parse("IMD/IMAGE/CLOUDCOVER")?;
    if !(0.0..=1.0).contains(&cloud_cover) {
        return Err(TilerError::Data(format!(
            "cloud cover must lie in [0, 1], got {}",
            cloud_cover
        )));
    }

    let capture_time = parse_capture_time(fields.text("IMD/IMAGE/FIRSTLINETIME")?)?;

    let rpc = RpcModel {
        row_off: fields.parse("RPB/IMAGE/LINEOFFSET")?,
        row_scale: fields.parse("RPB/IMAGE/LINESCALE")?,
        col_off: fields.parse("RPB/IMAGE/SAMPOFFSET")?,
        col_scale: fields.parse("RPB/IMAGE/SAMPSCALE")?,
        lat_off: fields.parse("RPB/IMAGE/LATOFFSET")?,
        lat_scale: fields.parse("RPB/IMAGE/LATSCALE")?,
        lon_off: fields.parse("RPB/IMAGE/LONGOFFSET")?,
        lon_scale: fields.parse("RPB/IMAGE/LONGSCALE")?,
        alt_off: fields.parse("RPB/IMAGE/HEIGHTOFFSET")?,
        alt_scale: fields.parse("RPB/IMAGE/HEIGHTSCALE")?,
        row_num: fields.coefficients("RPB/IMAGE/LINENUMCOEFList/LINENUMCOEF")?,
        row_den: fields.coefficients("RPB/IMAGE/LINEDENCOEFList/LINEDENCOEF")?,
        col_num: fields.coefficients("RPB/IMAGE/SAMPNUMCOEFList/SAMPNUMCOEF")?,
        col_den: fields.coefficients("RPB/IMAGE/SAMPDENCOEFList/SAMPDENCOEF")?,
    };
    rpc.validate()?;

    Ok(ImageMetadata {
        width,
        height,
        capture_time,
        cloud_cover,
        sun_azimuth: fields.optional("IMD/IMAGE/MEANSUNAZ")?,
        sun_elevation: fields.optional("IMD/IMAGE/MEANSUNEL")?,
        sat_azimuth: fields.optional("IMD/IMAGE/MEANSATAZ")?,
        sat_elevation: fields.optional("IMD/IMAGE/MEANSATEL")?,
        rpc,
    })
}

/// Text content of every element, keyed by path below the root.
struct Fields(HashMap<String, String>);

impl Fields {
    fn collect(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<String> = Vec::new();
        let mut values = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(t)) if stack.len() > 1 => {
                    let text = t.unescape().map_err(|e| {
                        TilerError::Data(format!(
                            "XML text error at position {}: {}",
                            reader.buffer_position(),
                            e
                        ))
                    })?;
                    // First occurrence wins
                    values
                        .entry(stack[1..].join("/"))
                        .or_insert_with(|| text.into_owned());
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(TilerError::Data(format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(TilerError::Data(format!(
                "XML ended inside element {}",
                stack.join("/")
            )));
        }
        Ok(Self(values))
    }

    fn text(&self, key: &str) -> Result<&str> {
        self.0
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TilerError::Data(format!("missing element {}", key)))
    }

    fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.text(key)?;
        text.parse()
            .map_err(|e| TilerError::Data(format!("element {} = '{}': {}", key, text, e)))
    }

    fn optional(&self, key: &str) -> Result<Option<f64>> {
        if self.0.contains_key(key) {
            self.parse(key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn coefficients(&self, key: &str) -> Result<[f64; RPC_COEFFICIENTS]> {
        let text = self.text(key)?;
        let values = text
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>().map_err(|e| {
                    TilerError::Data(format!("coefficient '{}' in {}: {}", v, key, e))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        values.try_into().map_err(|values: Vec<f64>| {
            TilerError::Data(format!(
                "{} holds {} coefficients, expected {}",
                key,
                values.len(),
                RPC_COEFFICIENTS
            ))
        })
    }
}
