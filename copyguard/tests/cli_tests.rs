use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const ENV_VARS: [&str; 4] = [
    "COPYGUARD_CLAIM_POLICY",
    "COPYGUARD_SIMILARITY_THRESHOLD",
    "COPYGUARD_DEFAULT_CUTOFF",
    "RUST_LOG",
];

/// A throwaway copy of the `cafe_launch` demo project.
struct CopyguardTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl CopyguardTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("demos/cafe_launch");

        let dest = tmp.path().join("cafe_launch");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    /// An empty project directory: built-in defaults only.
    fn empty() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        Ok(Self { _tmp: tmp, root })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn copyguard(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("copyguard"));
        cmd.current_dir(&self.root);
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> Result<Value> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn test_rules_include_project_pack() -> Result<()> {
    let env = CopyguardTestEnv::new()?;

    env.copyguard()
        .args(["rules", "--module", "CTA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOC-901"))
        .stdout(predicate::str::contains("CNV-401"))
        .stdout(predicate::str::contains("cutoff 82"))
        .stdout(predicate::str::contains("PRC-301").not());
    Ok(())
}

#[test]
fn test_missing_project_file_falls_back_to_builtin() -> Result<()> {
    let env = CopyguardTestEnv::empty()?;

    env.copyguard()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("project 'copyguard'"))
        .stdout(predicate::str::contains("CRD-101"))
        .stdout(predicate::str::contains("LOC-901").not());
    Ok(())
}

#[test]
fn test_evaluate_json_reports_failure() -> Result<()> {
    let env = CopyguardTestEnv::new()?;

    let output = env
        .copyguard()
        .args([
            "evaluate",
            "--module",
            "GENERAL",
            "--format",
            "json",
            "스타벅스보다 진한 커피. 지금 바로 방문하세요.",
        ])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let card = stdout_json(&output)?;
    assert_eq!(card["total_score"], 80);
    assert_eq!(card["cutoff"], 84);
    assert_eq!(card["pass"], false);
    assert_eq!(card["hard_fail"], false);
    assert_eq!(card["triggered_rule_ids"], serde_json::json!(["LOC-901"]));
    assert!(card.get("safe_fix").is_none());
    Ok(())
}

#[test]
fn test_env_overrides_default_cutoff() -> Result<()> {
    let env = CopyguardTestEnv::new()?;
    let copy = "스타벅스보다 진한 커피.";

    // BANNER has no policy: the project default cutoff (84) applies
    env.copyguard()
        .args(["evaluate", "-m", "BANNER", copy])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Score: 80 / cutoff 84"));

    env.copyguard()
        .env("COPYGUARD_DEFAULT_CUTOFF", "75")
        .args(["evaluate", "-m", "BANNER", copy])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ PASS"));
    Ok(())
}

#[test]
fn test_evaluate_annotates_hard_fail_from_file() -> Result<()> {
    let env = CopyguardTestEnv::new()?;
    std::fs::write(env.root.join("copy.txt"), "무조건 만족하는 커피")?;

    env.copyguard()
        .args(["evaluate", "-m", "GENERAL", "--file", "copy.txt", "--annotate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("CRD-101"))
        .stdout(predicate::str::contains("[검토 필요] 절대적 보장 표현"))
        .stderr(predicate::str::contains("hard fail"));
    Ok(())
}

#[test]
fn test_sanitize_writes_module_atomically() -> Result<()> {
    let env = CopyguardTestEnv::new()?;

    env.copyguard()
        .args([
            "sanitize",
            "--module",
            "FEATURES",
            "--input",
            "reply_features.txt",
            "--output",
            "out/features.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("out/features.json"));

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(env.root.join("out/features.json"))?)?;
    assert_eq!(written["module_id"], "FEATURES");

    let slots = written["slots"].as_object().context("slots should be an object")?;
    assert_eq!(slots.len(), 2, "undeclared keys are dropped");
    assert_eq!(slots["title"], "카페 모아의 세 가지 약속");

    let bullets = slots["bullets"].as_array().context("bullets should be a list")?;
    let bullets: Vec<&str> = bullets.iter().filter_map(Value::as_str).collect();
    assert_eq!(bullets.len(), 4, "the placeholder bullet is dropped");
    assert_eq!(bullets[0], "매일 아침 직접 로스팅");
    assert_eq!(bullets[3], "42");
    assert!(bullets.iter().all(|b| b.chars().count() <= 40));
    Ok(())
}

#[test]
fn test_sanitize_unknown_module_fails() -> Result<()> {
    let env = CopyguardTestEnv::new()?;

    env.copyguard()
        .args(["sanitize", "-m", "NOPE", "-i", "reply_features.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'NOPE' not found"));
    Ok(())
}

#[test]
fn test_gate_publishable_brochure() -> Result<()> {
    let env = CopyguardTestEnv::new()?;

    env.copyguard()
        .args(["gate", "--document", "brochure.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gate: no findings"))
        .stdout(predicate::str::contains("SEASON_MENU"))
        .stdout(predicate::str::contains("Publishable"));
    Ok(())
}

#[test]
fn test_gate_report_on_draft() -> Result<()> {
    let env = CopyguardTestEnv::new()?;

    let output = env
        .copyguard()
        .args([
            "gate",
            "-d",
            "brochure_draft.json",
            "--format",
            "json",
            "--output",
            "target/review.json",
        ])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let review = stdout_json(&output)?;
    assert_eq!(review["publishable"], false);
    assert_eq!(review["gate"]["ok"], false);

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(env.root.join("target/review.json"))?)?;
    assert_eq!(saved, review);

    let mut findings = Vec::new();
    for bucket in ["errors", "warnings"] {
        for w in review["gate"][bucket].as_array().context("findings list")? {
            let location: Vec<&str> = ["page_id", "module_id", "slot_key"]
                .iter()
                .filter_map(|k| w[*k].as_str())
                .collect();
            findings.push(format!(
                "{} {} {}",
                w["severity"].as_str().unwrap_or_default(),
                w["code"].as_str().unwrap_or_default(),
                location.join("/")
            ));
        }
    }
    insta::assert_json_snapshot!("gate_findings", findings);

    // Unknown modules are still scored, under their own id
    let hero = review["module_scores"]
        .as_array()
        .context("module scores")?
        .iter()
        .find(|m| m["module_id"] == "HERO")
        .context("HERO scored")?;
    assert_eq!(hero["scorecard"]["hard_fail"], true);
    assert!(
        hero["scorecard"]["triggered_rule_ids"]
            .as_array()
            .is_some_and(|ids| ids.iter().any(|id| id == "CRD-102"))
    );
    Ok(())
}

#[test]
fn test_env_claim_policy_escalates_banned_claims() -> Result<()> {
    let env = CopyguardTestEnv::new()?;
    let doc = env.root.join("brochure.json");
    let body = std::fs::read_to_string(&doc)?
        .replace("직접 로스팅한 원두 3종", "업계 1위 원두 3종");
    std::fs::write(&doc, body)?;

    let review = |policy: Option<&str>| -> Result<Value> {
        let mut cmd = env.copyguard();
        if let Some(p) = policy {
            cmd.env("COPYGUARD_CLAIM_POLICY", p);
        }
        let output = cmd
            .args(["gate", "-d", "brochure.json", "--format", "json"])
            .output()?;
        stdout_json(&output)
    };

    let standard = review(None)?;
    assert_eq!(standard["gate"]["ok"], true);
    assert_eq!(standard["gate"]["warnings"][0]["code"], "BANNED_CLAIM");

    let strict = review(Some("strict"))?;
    assert_eq!(strict["gate"]["ok"], false);
    assert_eq!(strict["gate"]["errors"][0]["code"], "BANNED_CLAIM");
    Ok(())
}
