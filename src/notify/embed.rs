use chrono::{Local, Utc};
use serde_json::{json, Value};
use url::Url;

use crate::models::{AlertKind, ComparisonRow, LinkPair};
use crate::parsers::format_price;

pub fn create_embed(
    kind: AlertKind,
    row: &ComparisonRow,
    pair: &LinkPair,
    precision: u32,
) -> Value {
    let mut fields = vec![
        json!({
            "name": "Store price:",
            "value": format!("**{}**", format_price(row.a_price, precision)),
            "inline": true
        }),
        json!({
            "name": "Competitor price:",
            "value": format!("**{}**", format_price(row.b_price, precision)),
            "inline": true
        }),
        json!({
            "name": "\u{200B}",
            "value": "\u{200B}",
            "inline": false
        }),
        json!({
            "name": "Store SKU:",
            "value": format!("**{}**", ComparisonRow::sku_display(&row.a_sku)),
            "inline": true
        }),
        json!({
            "name": "Competitor SKU:",
            "value": format!("**{}**", ComparisonRow::sku_display(&row.b_sku)),
            "inline": true
        }),
    ];

    // Listed SKUs only matter for the sheet-vs-page alerts
    match kind {
        AlertKind::LocalSkuMismatch => {
            if let Some(expected) = &pair.expected_sku_a {
                fields.push(json!({
                    "name": "Listed store SKU:",
                    "value": format!("**{}**", expected),
                    "inline": false
                }));
            }
        }
        AlertKind::CompetitorSkuMismatch => {
            if let Some(expected) = &pair.expected_sku_b {
                fields.push(json!({
                    "name": "Listed competitor SKU:",
                    "value": format!("**{}**", expected),
                    "inline": false
                }));
            }
        }
        _ => {}
    }

    fields.push(json!({
        "name": "Links:",
        "value": format!("{} | {}", link_markdown("Store", &pair.link_a), link_markdown("Competitor", &pair.link_b)),
        "inline": false
    }));

    json!({
        "title": format!("Row {}: {} mismatch", row.sequence, kind.label()),
        "description": kind.message(),
        "color": kind.color(),
        "fields": fields,
        "footer": {
            "text": format!("{} - Detected: {}",
                kind.label(),
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )
        },
        "timestamp": Utc::now().to_rfc3339()
    })
}

fn link_markdown(label: &str, link: &str) -> String {
    match Url::parse(link) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            format!("[{}]({})", label, url)
        }
        _ => format!("{}: {}", label, link),
    }
}
