//! nav-reward-replay
//!
//! Replays a recorded step trace through the reward engine:
//! - Reads a JSON config (reward settings plus optional `max_steps`)
//! - Reads one `StepInputs` JSON object per line from a trace file or stdin
//! - Writes one scored outcome per line to stdout, starting a new episode
//!   after every terminal step

use anyhow::{Context, Result};
use nav_reward_core::{
    Episode, EpisodeConfig, OutcomeTally, RewardConfig, RewardEvaluator, RuleId, StepInputs,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Replay configuration file contents
#[derive(Debug, Deserialize)]
struct ReplayConfig {
    #[serde(flatten)]
    reward: RewardConfig,
    #[serde(flatten)]
    episode: EpisodeConfig,
}

async fn load_config(path: &str) -> Result<ReplayConfig> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path))
}

/// One log line per reward component the rule can report
fn component_lines(rule: RuleId) -> Vec<String> {
    rule.components()
        .into_iter()
        .map(|c| {
            let range = c
                .range
                .map(|[lo, hi]| format!("[{}, {}]", lo, hi))
                .unwrap_or_else(|| "unbounded".to_string());
            format!(
                "{} x{} {}: {}",
                c.name,
                c.default_weight,
                range,
                c.description.unwrap_or_default()
            )
        })
        .collect()
}

/// Score every line of the trace, returning the number of steps replayed
async fn replay<R: AsyncBufRead + Unpin>(reader: R, episode: &mut Episode) -> Result<u64> {
    let mut stdout = tokio::io::stdout();
    let mut lines = reader.lines();
    let mut episode_index = 0u64;
    let mut line_no = 0u64;
    let mut replayed = 0u64;

    episode.reset();
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let inputs: StepInputs = serde_json::from_str(&line)
            .with_context(|| format!("Invalid step on line {}", line_no))?;

        let outcome = match episode.step(&inputs) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no, e);
                continue;
            }
        };
        replayed += 1;

        let record = serde_json::json!({
            "episode": episode_index,
            "step": episode.steps(),
            "outcome": outcome,
        });
        stdout.write_all(record.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;

        if outcome.is_done {
            episode_index += 1;
            episode.reset();
        }
    }
    stdout.flush().await?;
    Ok(replayed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let Some(config_path) = args.get(1) else {
        anyhow::bail!("usage: nav-reward-replay <config.json> [trace.jsonl]");
    };
    let config = load_config(config_path).await?;

    let evaluator = RewardEvaluator::new(config.reward)?;
    info!(
        "Replaying with {} (max {} steps per episode)",
        evaluator.rule(),
        config.episode.max_steps
    );
    for line in component_lines(evaluator.rule()) {
        info!("  {}", line);
    }

    let tally = Arc::new(Mutex::new(OutcomeTally::new()));
    let mut episode = Episode::new(evaluator, config.episode);
    episode.add_observer(Box::new(tally.clone()));

    let replayed = match args.get(2) {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open trace {}", path))?;
            replay(BufReader::new(file), &mut episode).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &mut episode).await?,
    };

    let tally = tally
        .lock()
        .map_err(|_| anyhow::anyhow!("Outcome tally lock poisoned"))?;
    info!(
        "Replayed {} steps over {} finished episodes, success rate {:.2}, mean reward {:.3}",
        replayed,
        tally.episodes,
        tally.success_rate().unwrap_or(0.0),
        tally.mean_reward().unwrap_or(0.0)
    );
    for (reason, count) in &tally.by_reason {
        info!("  {}: {}", reason, count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_reward_core::{DoneReason, EpisodeObserver, EpisodeSummary};

    const TRACE: &str = r#"{"scan": [2.0, 3.0], "goal": [3.0, 0.1]}
{"scan": [2.0], "goal": [2.0, 0.1], "child": [{"distance": 4.0}]}

{"scan": [], "goal": [2.0, 0.1]}
{"scan": [0.1], "goal": [1.5, 0.0]}
{"scan": [2.0], "goal": [0.2, 0.0]}
"#;

    fn replay_config() -> ReplayConfig {
        serde_json::from_str(
            r#"{"robot_radius": 0.3, "safe_dist": 0.6, "safe_dist_adult": 1.0, "max_steps": 50}"#,
        )
        .unwrap()
    }

    struct Reasons(Vec<Option<DoneReason>>);

    impl EpisodeObserver for Reasons {
        fn on_episode_end(&mut self, summary: &EpisodeSummary) {
            self.0.push(summary.done_reason);
        }
    }

    #[test]
    fn test_replay_config_flattens() {
        let config = replay_config();
        assert_eq!(config.reward.rule, "rule_01");
        assert_eq!(config.reward.goal_radius, 0.25);
        assert_eq!(config.episode.max_steps, 50);
    }

    #[test]
    fn test_component_lines_list_pipeline() {
        let lines = component_lines(RuleId::Rule00);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("goal_reached x1 [15, 15]"), "{}", lines[0]);
        assert!(lines[3].starts_with("collision x1 [-10, 0]"), "{}", lines[3]);
        assert!(lines[4].starts_with("goal_approach x1 unbounded"), "{}", lines[4]);
        assert_eq!(component_lines(RuleId::Rule01).len(), 8);
    }

    #[test]
    fn test_replay_trace() {
        let config = replay_config();
        let reasons = Arc::new(Mutex::new(Reasons(Vec::new())));
        let mut episode = Episode::new(RewardEvaluator::new(config.reward).unwrap(), config.episode);
        episode.add_observer(Box::new(reasons.clone()));

        let replayed = tokio_test::block_on(replay(BufReader::new(TRACE.as_bytes()), &mut episode))
            .unwrap();

        // blank line ignored, empty scan skipped
        assert_eq!(replayed, 4);
        assert_eq!(
            reasons.lock().unwrap().0,
            vec![Some(DoneReason::Collision), Some(DoneReason::GoalReached)]
        );
    }

    #[test]
    fn test_replay_rejects_malformed_line() {
        let config = replay_config();
        let mut episode = Episode::new(RewardEvaluator::new(config.reward).unwrap(), config.episode);
        let result = tokio_test::block_on(replay(BufReader::new(&b"{not json}\n"[..]), &mut episode));
        assert!(result.is_err());
    }
}
