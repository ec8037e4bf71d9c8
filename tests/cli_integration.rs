#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        Self { dir }
    }

    fn initialized() -> Self {
        let env = Self::new();
        env.run_ok(&["init"]);
        env
    }

    fn home(&self) -> std::path::PathBuf {
        self.dir.path().join("home")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskmarket").expect("binary");
        cmd.current_dir(self.dir.path())
            .env("TASKMARKET_HOME", self.home())
            .env_remove("TASKMARKET_LOG");
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut a: Vec<&str> = args.to_vec();
        a.push("--json");
        let output = self.cmd().args(&a).output().expect("run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"))
    }

    fn run_ok(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], true, "expected success=true: {v}");
        v
    }

    fn run_err(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], false, "expected success=false: {v}");
        v
    }

    fn post_task(&self, client: &str, min: &str, max: &str) -> String {
        let v = self.run_ok(&[
            "--as", client, "--role", "client",
            "task", "post", "Paint the fence",
            "--category", "painting",
            "--min-price", min,
            "--max-price", max,
        ]);
        v["data"]["task"]["id"].as_str().unwrap().to_string()
    }

    fn submit_bid(&self, helper: &str, task_id: &str, price: &str) -> String {
        let v = self.run_ok(&[
            "--as", helper, "--role", "helper",
            "bid", "submit", task_id, "--price", price,
        ]);
        v["data"]["bid"]["id"].as_str().unwrap().to_string()
    }

    /// Post, bid, accept and complete; returns (task_id, accepted bid_id).
    fn completed_task(&self, price: &str) -> (String, String) {
        let task_id = self.post_task("alice", "3000", "6000");
        let bid_id = self.submit_bid("bob", &task_id, price);
        self.run_ok(&["--as", "alice", "--role", "client", "bid", "accept", &task_id, &bid_id]);
        self.run_ok(&["--as", "bob", "--role", "helper", "task", "complete", &task_id]);
        (task_id, bid_id)
    }
}

fn error_code(v: &Value) -> &str {
    v["error"]["code"].as_str().unwrap_or_default()
}

// ─── init ──────────────────────────────────────────────────────────

#[test]
fn init_creates_database_and_config() {
    let env = TestEnv::new();
    let v = env.run_ok(&["init"]);
    assert!(v["data"]["path"].as_str().unwrap().ends_with("market.db"));
    assert!(env.home().join("market.db").exists());

    let config: Value =
        serde_json::from_str(&fs::read_to_string(env.home().join("config.json")).unwrap()).unwrap();
    assert_eq!(config["busy_timeout_ms"], 5000);
    assert_eq!(config["notifications"], "outbox");
}

#[test]
fn init_is_repeatable_and_keeps_data() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    env.run_ok(&["init"]);
    let v = env.run_ok(&["task", "show", &task_id]);
    assert_eq!(v["data"]["task"]["status"], "open");
}

#[test]
fn commands_before_init_fail() {
    let env = TestEnv::new();
    let v = env.run_err(&["task", "list"]);
    assert_eq!(error_code(&v), "NOT_INITIALIZED");
}

#[test]
fn error_exits_nonzero_and_reports_on_stderr() {
    let env = TestEnv::new();
    env.cmd()
        .args(["task", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("init"));
}

// ─── end-to-end lifecycle ──────────────────────────────────────────

#[test]
fn full_marketplace_flow() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "3000", "6000");

    let bid_bob = env.submit_bid("bob", &task_id, "4000");
    let bid_carol = env.submit_bid("carol", &task_id, "5000");

    let v = env.run_ok(&["--as", "alice", "--role", "client", "bid", "accept", &task_id, &bid_bob]);
    assert_eq!(v["data"]["task"]["status"], "in_progress");
    assert_eq!(v["data"]["task"]["selected_helper_id"], "bob");
    let bids = v["data"]["bids"].as_array().unwrap();
    let status_of = |id: &str| {
        bids.iter()
            .find(|b| b["id"] == id)
            .map(|b| b["status"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(status_of(&bid_bob), "accepted");
    assert_eq!(status_of(&bid_carol), "rejected");

    let v = env.run_ok(&["--as", "bob", "--role", "helper", "task", "complete", &task_id]);
    assert_eq!(v["data"]["task"]["status"], "completed");
    assert!(v["data"]["task"]["completed_at"].is_string());

    let v = env.run_ok(&["--as", "alice", "--role", "client", "pay", &task_id, "--amount", "4000"]);
    assert_eq!(v["data"]["task"]["payment_status"], true);
    assert_eq!(v["data"]["task"]["payment_amount"], 4000);

    let v = env.run_ok(&["--as", "bob", "--role", "helper", "earnings", "balance"]);
    assert_eq!(v["data"]["available"], 4000);
    assert_eq!(v["data"]["total_earnings"], 4000);
    assert_eq!(v["data"]["health_insurance_display"], 200);

    let v = env.run_ok(&["--as", "bob", "--role", "helper", "earnings", "withdraw"]);
    assert_eq!(v["data"]["withdrawn_amount"], 3800);
    assert_eq!(v["data"]["contribution"], 200);
    assert_eq!(v["data"]["gross_amount"], 4000);

    let v = env.run_err(&["--as", "bob", "--role", "helper", "earnings", "withdraw"]);
    assert_eq!(error_code(&v), "NO_FUNDS");

    let v = env.run_ok(&["--as", "bob", "--role", "helper", "earnings", "history"]);
    assert_eq!(v["data"]["earnings"][0]["status"], "withdrawn");
    assert_eq!(v["data"]["withdrawals"].as_array().unwrap().len(), 1);
    assert_eq!(v["data"]["withdrawals"][0]["status"], "completed");
}

#[test]
fn manual_assign_and_start_path() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let v = env.run_ok(&["--as", "alice", "--role", "client", "task", "assign", &task_id]);
    assert_eq!(v["data"]["task"]["status"], "assigned");
    let v = env.run_ok(&["--as", "alice", "--role", "client", "task", "start", &task_id]);
    assert_eq!(v["data"]["task"]["status"], "in_progress");

    // in_progress cannot go back to assigned
    let v = env.run_err(&["--as", "alice", "--role", "client", "task", "assign", &task_id]);
    assert_eq!(error_code(&v), "INVALID_TRANSITION");
}

#[test]
fn cancelled_task_is_terminal_and_rejects_bids() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let bid_id = env.submit_bid("bob", &task_id, "150");

    let v = env.run_ok(&["--as", "alice", "--role", "client", "task", "cancel", &task_id]);
    assert_eq!(v["data"]["task"]["status"], "cancelled");

    let v = env.run_ok(&["task", "show", &task_id]);
    assert_eq!(v["data"]["bids"][0]["id"], bid_id.as_str());
    assert_eq!(v["data"]["bids"][0]["status"], "rejected");

    let v = env.run_err(&["--as", "alice", "--role", "client", "task", "assign", &task_id]);
    assert_eq!(error_code(&v), "INVALID_TRANSITION");
}

// ─── bids ──────────────────────────────────────────────────────────

#[test]
fn bid_outside_budget_is_refused() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "3000", "6000");
    let v = env.run_err(&["--as", "bob", "--role", "helper", "bid", "submit", &task_id, "--price", "7000"]);
    assert_eq!(error_code(&v), "OUT_OF_RANGE");
    let v = env.run_err(&["--as", "bob", "--role", "helper", "bid", "submit", &task_id, "--price", "2999"]);
    assert_eq!(error_code(&v), "OUT_OF_RANGE");
    // bounds are inclusive
    env.submit_bid("bob", &task_id, "6000");
}

#[test]
fn second_live_bid_from_same_helper_is_refused() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let bid_id = env.submit_bid("bob", &task_id, "150");
    let v = env.run_err(&["--as", "bob", "--role", "helper", "bid", "submit", &task_id, "--price", "160"]);
    assert_eq!(error_code(&v), "DUPLICATE_BID");

    // after withdrawing, a fresh bid is allowed
    let v = env.run_ok(&["--as", "bob", "--role", "helper", "bid", "withdraw", &bid_id]);
    assert_eq!(v["data"]["bid"]["status"], "withdrawn");
    env.submit_bid("bob", &task_id, "160");
}

#[test]
fn bids_on_closed_task_are_refused() {
    let env = TestEnv::initialized();
    let (task_id, _) = env.completed_task("4000");
    let v = env.run_err(&["--as", "dave", "--role", "helper", "bid", "submit", &task_id, "--price", "4000"]);
    assert_eq!(error_code(&v), "TASK_NOT_OPEN");
}

#[test]
fn withdrawing_accepted_bid_reopens_task() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let bid_id = env.submit_bid("bob", &task_id, "150");
    env.run_ok(&["--as", "alice", "--role", "client", "bid", "accept", &task_id, &bid_id]);

    let v = env.run_ok(&["--as", "bob", "--role", "helper", "bid", "withdraw", &bid_id]);
    assert_eq!(v["data"]["task"]["status"], "open");

    let v = env.run_ok(&["task", "show", &task_id]);
    assert!(v["data"]["task"]["selected_helper_id"].is_null());
}

#[test]
fn reject_single_bid() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let bid_id = env.submit_bid("bob", &task_id, "150");
    let v = env.run_ok(&["--as", "alice", "--role", "client", "bid", "reject", &task_id, &bid_id]);
    assert_eq!(v["data"]["bid"]["status"], "rejected");
    assert!(v["data"]["bid"]["rejected_at"].is_string());

    let v = env.run_ok(&["--as", "bob", "bid", "list"]);
    assert_eq!(v["data"]["bids"].as_array().unwrap().len(), 1);
}

// ─── authorization ─────────────────────────────────────────────────

#[test]
fn only_the_owner_may_accept() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let bid_id = env.submit_bid("bob", &task_id, "150");
    let v = env.run_err(&["--as", "mallory", "--role", "client", "bid", "accept", &task_id, &bid_id]);
    assert_eq!(error_code(&v), "UNAUTHORIZED");
    assert_eq!(v["error"]["retryable"], false);
}

#[test]
fn wrong_role_is_unauthorized() {
    let env = TestEnv::initialized();
    let v = env.run_err(&[
        "--as", "bob", "--role", "helper",
        "task", "post", "Mow lawn",
        "--category", "gardening", "--min-price", "10", "--max-price", "20",
    ]);
    assert_eq!(error_code(&v), "UNAUTHORIZED");
}

#[test]
fn transition_requires_identity() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let v = env.run_err(&["task", "cancel", &task_id]);
    assert_eq!(error_code(&v), "VALIDATION_ERROR");
}

// ─── payments ──────────────────────────────────────────────────────

#[test]
fn paying_twice_is_refused() {
    let env = TestEnv::initialized();
    let (task_id, _) = env.completed_task("4000");
    env.run_ok(&["--as", "alice", "--role", "client", "pay", &task_id, "--amount", "4000"]);
    let v = env.run_err(&["--as", "alice", "--role", "client", "pay", &task_id, "--amount", "4000"]);
    assert_eq!(error_code(&v), "ALREADY_PAID");

    let v = env.run_ok(&["--as", "bob", "--role", "helper", "earnings", "balance"]);
    assert_eq!(v["data"]["available"], 4000);
}

#[test]
fn payment_must_match_accepted_price() {
    let env = TestEnv::initialized();
    let (task_id, _) = env.completed_task("4000");
    let v = env.run_err(&["--as", "alice", "--role", "client", "pay", &task_id, "--amount", "3999"]);
    assert_eq!(error_code(&v), "AMOUNT_MISMATCH");
}

#[test]
fn paying_unfinished_task_is_refused() {
    let env = TestEnv::initialized();
    let task_id = env.post_task("alice", "100", "200");
    let v = env.run_err(&["--as", "alice", "--role", "client", "pay", &task_id, "--amount", "150"]);
    assert_eq!(error_code(&v), "NOT_COMPLETED");
}

#[test]
fn unknown_task_is_reported() {
    let env = TestEnv::initialized();
    let v = env.run_err(&["task", "show", "01NOPE"]);
    assert_eq!(error_code(&v), "TASK_NOT_FOUND");
}

// ─── notifications ─────────────────────────────────────────────────

#[test]
fn notifications_are_stored_per_recipient() {
    let env = TestEnv::initialized();
    let (task_id, _) = env.completed_task("4000");
    env.run_ok(&["--as", "alice", "--role", "client", "pay", &task_id, "--amount", "4000"]);

    let v = env.run_ok(&["--as", "bob", "notifications"]);
    let kinds: Vec<&str> = v["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"bid_accepted"), "{kinds:?}");
    assert!(kinds.contains(&"payment_received"), "{kinds:?}");

    let v = env.run_ok(&["--as", "alice", "notifications"]);
    let kinds: Vec<&str> = v["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"new_bid"), "{kinds:?}");
    assert!(kinds.contains(&"payment_sent"), "{kinds:?}");
}

#[test]
fn log_mode_stores_no_notifications() {
    let env = TestEnv::initialized();
    fs::write(env.home().join("config.json"), r#"{ "notifications": "log" }"#).unwrap();
    let task_id = env.post_task("alice", "100", "200");
    env.submit_bid("bob", &task_id, "150");
    let v = env.run_ok(&["--as", "alice", "notifications"]);
    assert!(v["data"]["notifications"].as_array().unwrap().is_empty());
}

#[test]
fn malformed_config_is_reported() {
    let env = TestEnv::initialized();
    fs::write(env.home().join("config.json"), "{ not json").unwrap();
    let v = env.run_err(&["task", "list"]);
    assert_eq!(error_code(&v), "VALIDATION_ERROR");
}
