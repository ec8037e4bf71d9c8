use crate::models::{Bid, EarningRecord, EarningsSummary, StoredNotification, Task, Withdrawal};

fn short(id: &str) -> &str {
    &id[..std::cmp::min(8, id.len())]
}

pub fn print_task(t: &Task) {
    println!("Task: {} ({})", t.title, t.id);
    if let Some(ref desc) = t.description {
        println!("  Description: {desc}");
    }
    println!("  Category: {}", t.category.as_str());
    if let Some(ref location) = t.location {
        println!("  Location: {location}");
    }
    println!("  Budget: {} - {}", t.min_price, t.max_price);
    if let Some(ref hours) = t.estimated_hours {
        println!("  Estimated hours: {hours}");
    }
    println!("  Status: {}", t.status.as_str());
    println!("  Client: {}", t.client_id);
    if let Some(ref helper) = t.selected_helper_id {
        println!("  Helper: {helper}");
    }
    if let Some(ref completed) = t.completed_at {
        println!("  Completed: {completed}");
    }
    if t.payment_status {
        println!(
            "  Paid: {} on {}",
            t.payment_amount.unwrap_or_default(),
            t.payment_date.as_deref().unwrap_or("?")
        );
    }
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        println!(
            "  [{}] {} ({}) {} {}-{}",
            t.status.as_str(),
            t.title,
            short(&t.id),
            t.category.as_str(),
            t.min_price,
            t.max_price
        );
    }
}

pub fn print_bid_list(bids: &[Bid]) {
    if bids.is_empty() {
        println!("No bids found.");
        return;
    }
    for b in bids {
        println!(
            "  [{}] {} by @{} on {} price={}",
            b.status.as_str(),
            b.id,
            b.helper_id,
            short(&b.task_id),
            b.proposed_price
        );
        if let Some(ref msg) = b.message {
            println!("      \"{msg}\"");
        }
    }
}

pub fn print_summary(helper_id: &str, s: &EarningsSummary) {
    println!("Earnings for @{helper_id}");
    println!("  Total earned:      {}", s.total_earnings);
    println!("  Available:         {}", s.available);
    println!("  Withdrawn:         {}", s.withdrawn);
    println!("  Health insurance:  {} (display only)", s.health_insurance_display);
}

pub fn print_history(earnings: &[EarningRecord], withdrawals: &[Withdrawal]) {
    if earnings.is_empty() && withdrawals.is_empty() {
        println!("No earnings yet.");
        return;
    }
    if !earnings.is_empty() {
        println!("Earnings:");
        for e in earnings {
            println!("  {} +{} [{}] task {}", e.created_at, e.amount, e.status.as_str(), short(&e.task_id));
        }
    }
    if !withdrawals.is_empty() {
        println!("Withdrawals:");
        for w in withdrawals {
            println!(
                "  {} -{} paid out {} (contribution {}) [{}]",
                w.created_at,
                w.gross_amount,
                w.amount,
                w.contribution,
                w.status.as_str()
            );
        }
    }
}

pub fn print_notifications(notifications: &[StoredNotification]) {
    if notifications.is_empty() {
        println!("No notifications.");
        return;
    }
    for n in notifications {
        println!("  {} [{}] {}: {}", n.created_at, n.kind.as_str(), n.title, n.message);
    }
}
