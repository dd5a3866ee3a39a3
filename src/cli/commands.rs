//! Subcommand handlers.

use super::init::{self, InitConfig, InitResult};
use super::output::Output;
use super::{Commands, TripleCommands};
use crate::agents::{Agent, MemoryAgent};
use crate::memory::EMBEDDING_ORIGIN_KEY;
use crate::research::Watchlist;
use crate::types::{KnowledgeTriple, Payload};
use crate::utils::toml_config::AgentConfig;
use crate::workflows::{open_knowledge_base, Orchestrator, WorkflowSummary};
use anyhow::{bail, Context};
use serde_json::Value;

/// Run one subcommand against the loaded configuration
pub async fn dispatch(command: Commands, config: &AgentConfig, output: &Output) -> anyhow::Result<()> {
    match command {
        Commands::Init { path, force } => match init::run(InitConfig { path, force }, output) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => bail!("init failed: {}", e),
        },
        Commands::Run { json } => run_workflow(config, json, output).await,
        Commands::Research { topic, top_k, json } => {
            research(config, &topic, top_k, json, output).await
        }
        Commands::Recall { query } => recall(config, &query, output).await,
        Commands::Watch { topic } => watch(config, &topic, output),
        Commands::Watchlist => watchlist(config, output).await,
        Commands::Suggest => suggest(config, output).await,
        Commands::Store { content, meta } => store(config, &content, meta, output).await,
        Commands::Search { query, top_k, json } => search(config, &query, top_k, json, output).await,
        Commands::Triple(triple) => triples(config, triple, output).await,
        Commands::Status { json } => status(config, json, output).await,
    }
}

async fn run_workflow(config: &AgentConfig, json: bool, output: &Output) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config)
        .await
        .context("Failed to set up agents")?;
    let summary = orchestrator
        .run_workflow()
        .await
        .context("Research workflow failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&summary, output);
    Ok(())
}

fn print_summary(summary: &WorkflowSummary, output: &Output) {
    output.header("Workflow steps");
    let total = summary.steps.len() as u32;
    for (i, step) in summary.steps.iter().enumerate() {
        output.step(
            i as u32 + 1,
            total,
            &format!("{} ({}, {} ms)", step.step, step.agent, step.duration_ms),
        );
    }

    output.header("Agent logs");
    let logs = [
        ("planner", &summary.planner_log),
        ("researcher", &summary.researcher_log),
        ("memory", &summary.memory_log),
        ("critic", &summary.critic_log),
        ("executor", &summary.executor_log),
        ("bus", &summary.message_bus_log),
    ];
    for (source, events) in logs {
        for event in events {
            output.event(source, event);
        }
    }

    output.header("Final digest");
    for line in summary.final_digest.lines() {
        println!("    {}", line);
    }

    output.header("Outcome");
    output.kv("memory_item_id", &summary.memory_item_id);
    output.kv(
        "quick_recall_result",
        if summary.quick_recall_result.as_deref() == Some(summary.final_digest.as_str()) {
            "digest recalled"
        } else if summary.quick_recall_result.is_some() {
            "another item ranked first"
        } else {
            "nothing recalled"
        },
    );
    output.kv("critic_recommendation", &summary.critic_recommendation);
    output.kv("execution_result", &summary.execution_result);
    output.newline();
}

async fn research(
    config: &AgentConfig,
    topic: &str,
    top_k: usize,
    json: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config)
        .await
        .context("Failed to set up agents")?;
    let research = orchestrator
        .research_topic(topic, top_k)
        .await
        .with_context(|| format!("Research on '{}' failed", topic))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&research)?);
        return Ok(());
    }

    output.header("Synthesized digest");
    if research.digest.trim().is_empty() {
        output.info("No results found. Try a more general or academic query.");
    }
    for line in research.digest.lines() {
        println!("    {}", line);
    }
    output.newline();
    output.success(&format!("Digest stored in memory as {}", research.memory_item_id));
    Ok(())
}

async fn recall(config: &AgentConfig, query: &str, output: &Output) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config).await?;
    match orchestrator.recall(query).await? {
        Some(item) => println!("{}", item.content),
        None => output.info("No recall result found"),
    }
    Ok(())
}

fn watch(config: &AgentConfig, topic: &str, output: &Output) -> anyhow::Result<()> {
    if topic.trim().is_empty() {
        bail!("Please provide a topic to watch");
    }
    let mut watchlist = Watchlist::load(&config.search.watchlist_path)?;
    if watchlist.add(topic) {
        watchlist.save()?;
        output.success(&format!("Added '{}' to your watchlist", topic.trim()));
    } else {
        output.info(&format!("'{}' is already on your watchlist", topic.trim()));
    }
    Ok(())
}

async fn watchlist(config: &AgentConfig, output: &Output) -> anyhow::Result<()> {
    let watchlist = Watchlist::load(&config.search.watchlist_path)?;
    if watchlist.is_empty() {
        output.info("Your watchlist is empty. Add topics with 'watch <topic>'.");
        return Ok(());
    }

    output.header("Watchlist");
    for topic in watchlist.topics() {
        output.list_item(topic);
    }

    output.subheader("Latest research");
    let orchestrator = Orchestrator::from_config(config).await?;
    for report in orchestrator.check_watchlist(watchlist.topics()).await {
        match report.latest {
            Some(title) => output.kv(&format!("Latest for '{}'", report.topic), &title),
            None => output.info(&format!("No new research found for '{}'", report.topic)),
        }
    }
    output.newline();
    Ok(())
}

async fn suggest(config: &AgentConfig, output: &Output) -> anyhow::Result<()> {
    let knowledge = open_knowledge_base(config).await?;
    let orchestrator = Orchestrator::new(MemoryAgent::new(knowledge));
    match orchestrator.suggest_topic().await? {
        Some(topic) => output.info(&suggestion(&topic)),
        None => output.info("No prior research found. Try 'research <topic>' first."),
    }
    Ok(())
}

fn suggestion(topic: &str) -> String {
    format!(
        "Suggested next action: 'research {} updates' or 'recall {}'",
        topic, topic
    )
}

fn metadata_payload(meta: Vec<(String, String)>) -> Payload {
    meta.into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

async fn store(
    config: &AgentConfig,
    content: &str,
    meta: Vec<(String, String)>,
    output: &Output,
) -> anyhow::Result<()> {
    let knowledge = open_knowledge_base(config).await?;
    let metadata = (!meta.is_empty()).then(|| metadata_payload(meta));
    let item_id = knowledge.embed_and_store(content, metadata).await?;

    output.success(&format!("Stored {}", item_id));
    let placeholder = knowledge
        .get(&item_id)
        .await?
        .and_then(|item| item.metadata.get(EMBEDDING_ORIGIN_KEY).cloned())
        .is_some_and(|origin| origin == "placeholder");
    if placeholder {
        output.warning("Embedding is a random placeholder; semantic search will not rank it meaningfully");
    }
    Ok(())
}

async fn search(
    config: &AgentConfig,
    query: &str,
    top_k: i64,
    json: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let knowledge = open_knowledge_base(config).await?;
    let ranked = knowledge.semantic_search_scored(query, top_k).await?;

    if json {
        let hits: Vec<Value> = ranked
            .iter()
            .map(|(item, score)| {
                serde_json::json!({
                    "id": item.id,
                    "score": score,
                    "content": item.content,
                    "metadata": item.metadata,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if ranked.is_empty() {
        output.info("No stored knowledge matched");
        return Ok(());
    }
    for (rank, (item, score)) in ranked.iter().enumerate() {
        output.hit(rank + 1, *score, &item.id, &item.content);
    }
    Ok(())
}

fn print_triples(triples: &[KnowledgeTriple], output: &Output) {
    if triples.is_empty() {
        output.info("No triples found");
        return;
    }
    for t in triples {
        output.list_item(&format!("{} --{}--> {}", t.subject, t.predicate, t.object));
    }
}

async fn triples(config: &AgentConfig, command: TripleCommands, output: &Output) -> anyhow::Result<()> {
    let knowledge = open_knowledge_base(config).await?;
    match command {
        TripleCommands::Add {
            subject,
            predicate,
            object,
        } => {
            knowledge
                .add_triple(&subject, &predicate, &object, None)
                .await?;
            output.success(&format!("Added {} --{}--> {}", subject, predicate, object));
        }
        TripleCommands::Query {
            subject,
            predicate,
            object,
        } => {
            let found = knowledge
                .query(subject.as_deref(), predicate.as_deref(), object.as_deref())
                .await?;
            print_triples(&found, output);
        }
        TripleCommands::Related { topic } => {
            print_triples(&knowledge.related(&topic).await?, output);
        }
    }
    Ok(())
}

async fn status(config: &AgentConfig, json: bool, output: &Output) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config).await?;
    let mut statuses = Vec::new();
    for agent in orchestrator.agents() {
        statuses.push(agent.status().await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for status in statuses {
        output.subheader(status.role.as_str());
        for (key, value) in &status.counters {
            output.kv(key, &value.to_string());
        }
    }
    output.newline();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_names_topic_twice() {
        assert_eq!(
            suggestion("graphs"),
            "Suggested next action: 'research graphs updates' or 'recall graphs'"
        );
    }

    #[test]
    fn test_metadata_payload_keeps_strings() {
        let payload = metadata_payload(vec![
            ("source".into(), "notes".into()),
            ("year".into(), "2017".into()),
        ]);
        assert_eq!(payload["source"], "notes");
        assert_eq!(payload["year"], "2017");
    }
}
