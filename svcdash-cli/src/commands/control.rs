use tracing::debug;

use svcdash_core::action::ActionTracker;
use svcdash_core::directory::ServiceDirectory;
use svcdash_core::model::ServiceAction;
use svcdash_core::notify::Notification;

/// Apply `action` to each named service in order, printing one line per
/// result. Returns true when every call succeeded.
pub async fn run_control(
    directory: &dyn ServiceDirectory,
    action: ServiceAction,
    names: &[String],
) -> bool {
    let mut tracker = ActionTracker::new();
    let mut all_ok = true;

    for name in names {
        let ticket = match tracker.begin(name.as_str(), action) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                debug!(%rejected, "duplicate target skipped");
                continue;
            }
        };

        let outcome = directory.control_service(name, action).await;
        let settlement = tracker.settle(ticket, outcome);
        all_ok &= settlement.succeeded;
        print_result(&settlement.notification);
    }

    all_ok
}

fn print_result(notification: &Notification) {
    if notification.is_error() {
        eprintln!("\x1b[31m✗\x1b[0m {}", notification.message);
    } else {
        println!("\x1b[32m✓\x1b[0m {}", notification.message);
    }
}
