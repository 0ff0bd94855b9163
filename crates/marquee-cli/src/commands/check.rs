use anyhow::{anyhow, Result};

use marquee_core::config::ATTRIBUTE_PREFIX;
use marquee_core::{AppConfig, MarqueeAttributes, MarqueeConfig};

pub fn run(config: &AppConfig, attrs: &[String]) -> Result<()> {
    let attributes = if attrs.is_empty() {
        config.marquee.clone()
    } else {
        let pairs = parse_pairs(attrs)?;
        MarqueeAttributes::from_dataset(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    };

    let resolved = MarqueeConfig::resolve_with(&attributes, &config.tuning)?;

    println!("Config file: {}", AppConfig::config_path().display());
    println!();
    for (label, value) in describe(&resolved) {
        println!("  {:<12} {}", label, value);
    }

    Ok(())
}

/// Split `KEY=VALUE` flags, adding the attribute prefix where it is missing
fn parse_pairs(attrs: &[String]) -> Result<Vec<(String, String)>> {
    attrs
        .iter()
        .map(|attr| {
            let (key, value) = attr
                .split_once('=')
                .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", attr))?;
            let key = key.trim();
            let key = if key.starts_with(ATTRIBUTE_PREFIX) {
                key.to_string()
            } else {
                format!("{}{}", ATTRIBUTE_PREFIX, key)
            };
            Ok((key, value.to_string()))
        })
        .collect()
}

fn describe(config: &MarqueeConfig) -> Vec<(&'static str, String)> {
    let breakpoint = if config.breakpoint.is_always() {
        "always".to_string()
    } else {
        config.breakpoint.to_string()
    };
    let skew = config
        .skew_degrees
        .map(|deg| format!("{}deg", deg))
        .unwrap_or_else(|| "none".to_string());

    vec![
        ("Breakpoint:", breakpoint),
        ("Duration:", format!("{}s", config.duration.as_secs_f64())),
        ("Direction:", config.direction.to_string()),
        ("Skew:", skew),
        ("Debounce:", format!("{}ms", config.debounce.as_millis())),
        (
            "Items:",
            format!("+{} padding, at most {}", config.clone_padding, config.max_items),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_adds_prefix() {
        let pairs = parse_pairs(&["max=768".to_string(), "data-mc-skew=4".to_string()]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("data-mc-max".to_string(), "768".to_string()),
                ("data-mc-skew".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_pairs_rejects_bare_key() {
        assert!(parse_pairs(&["direction".to_string()]).is_err());
    }

    #[test]
    fn test_describe_resolved_config() {
        let attrs = MarqueeAttributes::from_dataset([
            ("data-mc-max", "768"),
            ("data-mc-direction", "auto"),
        ]);
        let config = MarqueeConfig::resolve(&attrs).unwrap();
        let lines = describe(&config);

        assert_eq!(lines[0], ("Breakpoint:", "(max-width: 767.98px)".to_string()));
        assert_eq!(lines[1], ("Duration:", "20s".to_string()));
        assert_eq!(lines[2], ("Direction:", "auto".to_string()));
        assert_eq!(lines[3], ("Skew:", "none".to_string()));
    }
}
