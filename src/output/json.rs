use serde_json::{json, Value};

use crate::error::MarketError;
use crate::models::{Bid, EarningRecord, EarningsSummary, StoredNotification, Task, Withdrawal, WithdrawalReceipt};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &MarketError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message,
            "retryable": err.is_retryable()
        }
    })
}

pub fn task_summary(t: &Task) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "category": t.category.as_str(),
        "status": t.status.as_str(),
        "min_price": t.min_price,
        "max_price": t.max_price
    })
}

pub fn task_detail(t: &Task) -> Value {
    json!({
        "id": t.id,
        "client_id": t.client_id,
        "title": t.title,
        "description": t.description,
        "category": t.category.as_str(),
        "location": t.location,
        "min_price": t.min_price,
        "max_price": t.max_price,
        "estimated_hours": t.estimated_hours,
        "status": t.status.as_str(),
        "payment_status": t.payment_status,
        "payment_amount": t.payment_amount,
        "payment_date": t.payment_date,
        "selected_helper_id": t.selected_helper_id,
        "created_at": t.created_at,
        "updated_at": t.updated_at,
        "completed_at": t.completed_at
    })
}

pub fn bid_json(b: &Bid) -> Value {
    json!({
        "id": b.id,
        "task_id": b.task_id,
        "helper_id": b.helper_id,
        "message": b.message,
        "proposed_price": b.proposed_price,
        "status": b.status.as_str(),
        "created_at": b.created_at,
        "accepted_at": b.accepted_at,
        "rejected_at": b.rejected_at
    })
}

pub fn summary_json(helper_id: &str, s: &EarningsSummary) -> Value {
    json!({
        "helper_id": helper_id,
        "total_earnings": s.total_earnings,
        "available": s.available,
        "withdrawn": s.withdrawn,
        "health_insurance_display": s.health_insurance_display
    })
}

pub fn receipt_json(r: &WithdrawalReceipt) -> Value {
    json!({
        "withdrawn_amount": r.withdrawn_amount,
        "contribution": r.contribution,
        "gross_amount": r.gross_amount
    })
}

pub fn earning_json(e: &EarningRecord) -> Value {
    json!({
        "id": e.id,
        "task_id": e.task_id,
        "amount": e.amount,
        "status": e.status.as_str(),
        "withdrawal_id": e.withdrawal_id,
        "created_at": e.created_at
    })
}

pub fn withdrawal_json(w: &Withdrawal) -> Value {
    json!({
        "id": w.id,
        "gross_amount": w.gross_amount,
        "contribution": w.contribution,
        "amount": w.amount,
        "status": w.status.as_str(),
        "created_at": w.created_at
    })
}

pub fn notification_json(n: &StoredNotification) -> Value {
    json!({
        "id": n.id,
        "kind": n.kind.as_str(),
        "title": n.title,
        "message": n.message,
        "related_id": n.related_id,
        "metadata": n.metadata,
        "created_at": n.created_at
    })
}
