//! The per-image loop: progress, interrupt handling, and JSONL output.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tagbatch_core::config::InterrogationConfig;
use tagbatch_core::prompt::strip_extra_networks;
use tagbatch_core::{
    BackendRegistry, BatchInterrogator, BatchStep, GenerationJob, InterrogationSession, JobState,
    StepOutcome,
};

use super::RunArgs;

/// One line of run output.
#[derive(Debug, Serialize)]
struct RunRecord {
    file: PathBuf,
    status: &'static str,
    prompt: String,
    negative_prompt: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    interrogation: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    interrupted: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    generation_params: BTreeMap<String, serde_json::Value>,
}

impl RunRecord {
    fn new(file: &Path, job: &GenerationJob, outcome: &StepOutcome) -> Self {
        let (status, interrogation, interrupted) = match outcome {
            StepOutcome::Disabled => ("disabled", String::new(), false),
            StepOutcome::Reused => ("reused", String::new(), false),
            StepOutcome::NoImage => ("no_image", String::new(), false),
            StepOutcome::Completed(report) => {
                let status = if report.injected() { "injected" } else { "empty" };
                (status, report.interrogation.clone(), report.interrupted)
            }
        };
        Self {
            file: file.to_path_buf(),
            status,
            prompt: job.prompt.clone(),
            negative_prompt: job.negative_prompt.clone(),
            interrogation,
            interrupted,
            generation_params: job.extra_generation_params.clone(),
        }
    }
}

/// Writes one JSON object per line to a file or stdout.
struct RecordWriter {
    inner: Box<dyn Write>,
}

impl RecordWriter {
    fn open(output: Option<&Path>) -> anyhow::Result<Self> {
        let inner: Box<dyn Write> = match output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(std::io::stdout()),
        };
        Ok(Self { inner })
    }

    fn write(&mut self, record: &RunRecord) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        writeln!(self.inner)?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
struct Tally {
    injected: u64,
    empty: u64,
    reused: u64,
    no_image: u64,
    disabled: u64,
    failed: u64,
}

impl Tally {
    fn count(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Completed(report) if report.injected() => self.injected += 1,
            StepOutcome::Completed(_) => self.empty += 1,
            StepOutcome::Reused => self.reused += 1,
            StepOutcome::NoImage => self.no_image += 1,
            StepOutcome::Disabled => self.disabled += 1,
        }
    }

    fn processed(&self) -> u64 {
        self.injected + self.empty + self.reused + self.no_image + self.disabled + self.failed
    }
}

/// Interrogate every file in order, threading one job and session through the batch.
pub async fn run_batch(
    args: &RunArgs,
    options: InterrogationConfig,
    registry: BackendRegistry,
    files: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let interrogator = BatchInterrogator::new(Arc::new(registry));
    let mut session = InterrogationSession::new();
    let mut job = GenerationJob::new(&args.prompt, &args.negative_prompt, args.batch_size);

    let state = Arc::new(JobState::new());
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current backend");
                state.interrupt();
            }
        });
    }

    let mut writer = RecordWriter::open(args.output.as_deref())?;
    let total = files.len();
    let progress = create_progress_bar(total as u64);
    let mut tally = Tally::default();
    let start_time = std::time::Instant::now();

    for (i, path) in files.iter().enumerate() {
        if state.is_interrupted() {
            tracing::info!("Interrupted before {:?}", path);
            break;
        }

        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                tally.failed += 1;
                tracing::error!("Failed: {:?} - {}", path, e);
                progress.inc(1);
                continue;
            }
        };
        job.init_images = vec![image];
        state.set_job(i as i64, total as i64);

        let mut step = BatchStep {
            batch_prompts: vec![strip_extra_networks(&job.prompt); args.batch_size],
            ..Default::default()
        };
        let outcome = interrogator
            .process_batch(&mut session, &mut job, &state, &mut step, &options)
            .await;

        tally.count(&outcome);
        let record = RunRecord::new(path, &job, &outcome);
        writer.write(&record)?;

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (i + 1) as f64 / elapsed;
            progress.set_message(format!("{:.2} img/sec", rate));
        }

        if record.interrupted {
            break;
        }
    }

    writer.flush()?;
    if let Some(output) = &args.output {
        tracing::info!("Output written to {:?}", output);
    }

    progress.finish_and_clear();
    print_summary(&tally, total as u64, start_time.elapsed());

    Ok(())
}

/// Create a progress bar for the interrogation loop.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .expect("static progress template")
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

fn print_summary(tally: &Tally, total: u64, elapsed: std::time::Duration) {
    let processed = tally.processed();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        processed as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Injected:     {:>8}", tally.injected);
    eprintln!("    No result:    {:>8}", tally.empty);
    if tally.reused > 0 {
        eprintln!("    Reused:       {:>8}", tally.reused);
    }
    if tally.no_image > 0 {
        eprintln!("    No image:     {:>8}", tally.no_image);
    }
    if tally.disabled > 0 {
        eprintln!("    Disabled:     {:>8}", tally.disabled);
    }
    if tally.failed > 0 {
        eprintln!("    Failed:       {:>8}", tally.failed);
    }
    if processed < total {
        eprintln!("    Not reached:  {:>8}", total - processed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.2} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbatch_core::types::InsertTarget;
    use tagbatch_core::StepReport;

    #[test]
    fn test_record_for_completed_step() {
        let mut job = GenerationJob::new("smile, hat, a castle", "", 1);
        job.set_param("Img2img batch WD model", Some("wd14".into()));
        let outcome = StepOutcome::Completed(StepReport {
            prompt: job.prompt.clone(),
            interrogation: "smile, hat".into(),
            target: InsertTarget::Prompt,
            interrupted: false,
        });

        let record = RunRecord::new(Path::new("a.png"), &job, &outcome);
        assert_eq!(record.status, "injected");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["interrogation"], "smile, hat");
        assert_eq!(json["generation_params"]["Img2img batch WD model"], "wd14");
        assert!(json.get("interrupted").is_none());
    }

    #[test]
    fn test_record_for_short_circuit_omits_empty_fields() {
        let job = GenerationJob::new("a castle", "blurry", 1);
        let record = RunRecord::new(Path::new("b.png"), &job, &StepOutcome::NoImage);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "no_image");
        assert_eq!(json["negative_prompt"], "blurry");
        assert!(json.get("interrogation").is_none());
        assert!(json.get("generation_params").is_none());
    }

    #[test]
    fn test_tally_counts_each_outcome_separately() {
        let completed = |interrogation: &str| {
            StepOutcome::Completed(StepReport {
                prompt: String::new(),
                interrogation: interrogation.into(),
                target: InsertTarget::Prompt,
                interrupted: false,
            })
        };
        let mut tally = Tally::default();
        for outcome in [
            completed("cat, "),
            completed(""),
            StepOutcome::Reused,
            StepOutcome::NoImage,
            StepOutcome::Disabled,
            StepOutcome::Disabled,
        ] {
            tally.count(&outcome);
        }
        assert_eq!(
            tally,
            Tally {
                injected: 1,
                empty: 1,
                reused: 1,
                no_image: 1,
                disabled: 2,
                failed: 0,
            }
        );
        assert_eq!(tally.processed(), 6);
    }

    #[test]
    fn test_record_writer_emits_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let job = GenerationJob::new("", "", 1);

        let mut writer = RecordWriter::open(Some(&path)).unwrap();
        writer
            .write(&RunRecord::new(Path::new("a.png"), &job, &StepOutcome::Disabled))
            .unwrap();
        writer
            .write(&RunRecord::new(Path::new("b.png"), &job, &StepOutcome::Reused))
            .unwrap();
        writer.flush().unwrap();
        drop(writer);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"reused\""));
    }
}
