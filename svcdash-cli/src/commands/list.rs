use svcdash_core::directory::{DirectoryError, ServiceDirectory};
use svcdash_core::filter::ServiceFilter;
use svcdash_core::model::Service;

/// Fetch once, filter, and print as a table or JSON.
pub async fn run_list(
    directory: &dyn ServiceDirectory,
    filter: &ServiceFilter,
    json: bool,
) -> Result<(), DirectoryError> {
    let services = directory.fetch_services().await?;
    let visible = filter.visible(&services);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else {
        print!("{}", format_table(&visible));
        let counts = filter.counts(&services);
        println!(
            "\n{} shown ({} total: {} active, {} inactive, {} failed)",
            visible.len(),
            counts.all,
            counts.active,
            counts.inactive,
            counts.failed
        );
    }
    Ok(())
}

pub fn format_table(services: &[&Service]) -> String {
    if services.is_empty() {
        return "No services found\n".to_string();
    }

    let name_w = services
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("SERVICE".len());
    let status_w = "INACTIVE".len();
    let state_w = services
        .iter()
        .map(|s| s.active_state.len() + s.sub_state.len() + 3)
        .max()
        .unwrap_or(0)
        .max("STATE".len());

    let mut out = format!(
        "{:<name_w$}  {:<status_w$}  {:<state_w$}  DESCRIPTION\n",
        "SERVICE", "STATUS", "STATE"
    );
    for s in services {
        let state = format!("{} / {}", s.active_state, s.sub_state);
        let line = format!(
            "{:<name_w$}  {:<status_w$}  {:<state_w$}  {}",
            s.name,
            s.status.as_str(),
            state,
            s.description
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
