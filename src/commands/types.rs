//! List deletable content types.

use anyhow::Result;

use bulksweep::client::SweepClient;

pub async fn run(server: &str, token: Option<String>, actor: &str) -> Result<()> {
    let client = SweepClient::new(server, token, actor);
    let types = client.list_types().await?;

    if types.is_empty() {
        println!("No deletable content types with taxonomies.");
        return Ok(());
    }

    for content_type in types {
        println!("{} ({})", content_type.label, content_type.id);
        for taxonomy in content_type.taxonomies {
            println!("  - {} ({})", taxonomy.label, taxonomy.id);
        }
    }
    Ok(())
}
