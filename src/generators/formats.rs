//! Generators for the string `format` keyword

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use url::Url;

/// 1900-01-01T00:00:00Z
const EARLIEST_TIMESTAMP: i64 = -2_208_988_800;
/// 2099-12-31T00:00:00Z
const LATEST_TIMESTAMP: i64 = 4_102_358_400;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const LABEL_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TOP_LEVEL_DOMAINS: [&str; 6] = ["com", "org", "net", "io", "dev", "example"];

/// String formats with a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DD HH:MM`
    DateTime,
    /// `local@host.tld`
    Email,
    /// dotted DNS name
    Hostname,
    /// dotted quad
    Ipv4,
    /// RFC 5952 text form
    Ipv6,
    /// absolute http(s) URI
    Uri,
}

impl FromStr for StringFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date" => Ok(StringFormat::Date),
            "date-time" => Ok(StringFormat::DateTime),
            "email" => Ok(StringFormat::Email),
            "hostname" => Ok(StringFormat::Hostname),
            "ipv4" => Ok(StringFormat::Ipv4),
            "ipv6" => Ok(StringFormat::Ipv6),
            "uri" => Ok(StringFormat::Uri),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StringFormat::Date => "date",
            StringFormat::DateTime => "date-time",
            StringFormat::Email => "email",
            StringFormat::Hostname => "hostname",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::Uri => "uri",
        };
        f.write_str(name)
    }
}

impl StringFormat {
    /// Produce one string in this format
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        match self {
            StringFormat::Date => Ok(random_date_time(rng)?[..10].to_string()),
            StringFormat::DateTime => random_date_time(rng),
            StringFormat::Email => Ok(format!(
                "{}@{}",
                random_label(rng, 1, 12),
                random_hostname(rng)
            )),
            StringFormat::Hostname => Ok(random_hostname(rng)),
            StringFormat::Ipv4 => Ok(Ipv4Addr::from(rng.gen::<u32>()).to_string()),
            StringFormat::Ipv6 => Ok(Ipv6Addr::from(rng.gen::<u128>()).to_string()),
            StringFormat::Uri => random_uri(rng),
        }
    }
}

fn random_date_time<R: Rng + ?Sized>(rng: &mut R) -> Result<String> {
    let seconds = rng.gen_range(EARLIEST_TIMESTAMP..=LATEST_TIMESTAMP);
    let moment: DateTime<Utc> = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| Error::Configuration(format!("timestamp {} out of range", seconds)))?;
    Ok(moment.format(DATE_TIME_FORMAT).to_string())
}

fn random_label<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> String {
    let len = rng.gen_range(min..=max);
    let mut label = String::with_capacity(len);
    // labels start with a letter
    label.push(char::from(rng.gen_range(b'a'..=b'z')));
    for _ in 1..len {
        label.push(char::from(LABEL_CHARSET[rng.gen_range(0..LABEL_CHARSET.len())]));
    }
    label
}

fn random_hostname<R: Rng + ?Sized>(rng: &mut R) -> String {
    let labels = rng.gen_range(1..=3);
    let mut parts: Vec<String> = (0..labels).map(|_| random_label(rng, 1, 10)).collect();
    let tld = TOP_LEVEL_DOMAINS.choose(rng).copied().unwrap_or("com");
    parts.push(tld.to_string());
    parts.join(".")
}

fn random_uri<R: Rng + ?Sized>(rng: &mut R) -> Result<String> {
    let scheme = if rng.gen_bool(0.5) { "https" } else { "http" };
    let segments: Vec<String> = (0..rng.gen_range(0..=3))
        .map(|_| random_label(rng, 1, 8))
        .collect();
    let text = format!("{}://{}/{}", scheme, random_hostname(rng), segments.join("/"));
    let url = Url::parse(&text)
        .map_err(|e| Error::Configuration(format!("generated invalid uri '{}': {}", text, e)))?;
    Ok(url.to_string())
}
