use lazy_static::lazy_static;
use nodeup_core::{Error, MetadataSource, Result};
use regex::Regex;
use tracing::info;

const REGION_KEY: &str = "placement/region";

/// The configured region if there is one, otherwise the one the metadata
/// service reports. Either way it has to look like an AWS region.
pub async fn discover(configured: Option<&str>, metadata: &dyn MetadataSource) -> Result<String> {
    let region = match configured {
        Some(region) => region.to_string(),
        None => metadata.get(REGION_KEY).await?,
    };
    validate(&region)?;
    info!(region = %region, "running in region");
    Ok(region)
}

lazy_static! {
    static ref REGION: Regex = Regex::new(r"^[a-z\-]{2,6}-[a-z]{4,9}-[0-9]$").unwrap();
}

/// Accepts `<area>-<direction>-<n>`, e.g. `us-east-1` or `us-gov-west-1`.
pub fn validate(region: &str) -> Result<()> {
    if REGION.is_match(region) {
        Ok(())
    } else {
        Err(Error::InvalidRegion(region.to_string()))
    }
}
