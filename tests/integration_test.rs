use std::fs;
use std::path::{Path, PathBuf};

use models_qa::config::Config;
use models_qa::error::LlmError;
use models_qa::{logger, App, GenerationOptions, TextGenerator};

/// 对所有问题返回固定回答的桩模型
struct FixedAnswer(&'static str);

impl TextGenerator for FixedAnswer {
    fn generate(&mut self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        assert!(prompt.starts_with("[INST] "));
        assert!(prompt.ends_with(" [/INST]"));
        assert_eq!(options.temperature, 0.0);
        Ok(self.0.to_string())
    }
}

/// 问题包含 "crash" 时失败
struct CrashOnKeyword;

impl TextGenerator for CrashOnKeyword {
    fn generate(&mut self, prompt: &str, _: &GenerationOptions) -> Result<String, LlmError> {
        if prompt.contains("crash") {
            Err(LlmError::Generation("malformed input".to_string()))
        } else {
            Ok(format!("  echo: {}  ", prompt.len()))
        }
    }
}

fn write_config(dir: &Path, questions: &str) -> PathBuf {
    let questions_path = dir.join("questions.txt");
    fs::write(&questions_path, questions).unwrap();

    let config_path = dir.join("parameters.toml");
    fs::write(
        &config_path,
        format!(
            "[paths]\nquestions_path = '{}'\nmodel_path = '{}'\n",
            questions_path.display(),
            dir.join("tiny-model.Q4_0.gguf").display()
        ),
    )
    .unwrap();
    config_path
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_end_to_end_with_stub_model() {
    logger::init(false);

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "What is 6 x 7?\n\n\nAnd 40 + 2?\n");
    let config = Config::load(&config_path).unwrap();

    let out = dir.path().join("QA_tiny-model.Q4_0.csv");
    let app = App::new(config, Some(out.clone()));
    assert_eq!(app.output_path(), out.as_path());

    let questions = app.load_questions().unwrap();
    assert_eq!(questions, vec!["What is 6 x 7?", "And 40 + 2?"]);

    let summary = app.process(&mut FixedAnswer("42"), &questions).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.answered, 2);
    assert_eq!(summary.failed, 0);
    assert!(summary.total_ms >= 0.0);

    let rows = read_csv(&out);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["Index", "Question", "Answer", "Time[ms]"]);
    assert_eq!(rows[1][0], "1");
    assert_eq!(rows[2][0], "2");
    assert_eq!(rows[1][1], "What is 6 x 7?");
    for row in &rows[1..] {
        assert_eq!(row[2], "42");
        assert!(row[3].parse::<f64>().unwrap() >= 0.0);
    }
}

#[test]
fn test_single_failure_does_not_abort_run() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "first\n\nplease crash\n\nthird");
    let out = dir.path().join("out.csv");
    let app = App::new(Config::load(&config_path).unwrap(), Some(out.clone()));

    let questions = app.load_questions().unwrap();
    let summary = app.process(&mut CrashOnKeyword, &questions).unwrap();

    assert_eq!(summary.answered, 2);
    assert_eq!(summary.failed, 1);

    let rows = read_csv(&out);
    let answers: Vec<&str> = rows[1..].iter().map(|r| r[2].as_str()).collect();
    assert_eq!(answers.len(), 3);
    assert_eq!(answers[1], "<ERROR>");
    assert!(answers[0].starts_with("echo: "));
    assert!(answers[2].starts_with("echo: "));
}

#[test]
fn test_empty_questions_file_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "\n\n   \n");
    let out = dir.path().join("out.csv");
    let app = App::new(Config::load(&config_path).unwrap(), Some(out.clone()));

    let questions = app.load_questions().unwrap();
    assert!(questions.is_empty());

    let summary = app.process(&mut FixedAnswer("unused"), &questions).unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(read_csv(&out).len(), 1);
}

#[test]
fn test_missing_questions_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "Q");
    fs::remove_file(dir.path().join("questions.txt")).unwrap();

    let app = App::new(Config::load(&config_path).unwrap(), None);
    assert!(app.load_questions().is_err());
}

#[test]
fn test_default_output_path_uses_model_stem() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "Q");
    let config = Config::load(&config_path).unwrap();
    let expected = config.output_csv_path();

    let app = App::new(config, None);
    assert_eq!(app.output_path(), expected.as_path());
}

/// 模型文件不存在时在推理前中止，不写出结果文件
#[cfg(feature = "llama")]
#[test]
fn test_missing_model_file_is_fatal() {
    use models_qa::error::{AppError, FileError};

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "What is 6 x 7?\n\nAnd 40 + 2?");
    let mut config = Config::load(&config_path).unwrap();
    let missing_model = dir.path().join("no-such-model.gguf");
    config.paths.model_path = missing_model.clone();

    let out = dir.path().join("out.csv");
    let app = App::new(config, Some(out.clone()));

    let err = app.run().unwrap_err();
    let not_found = err
        .chain()
        .find_map(|e| match e.downcast_ref::<AppError>() {
            Some(AppError::File(FileError::NotFound { path })) => Some(path.clone()),
            _ => None,
        })
        .expect("错误链中应包含 FileError::NotFound");
    assert_eq!(not_found, missing_model.display().to_string());
    assert!(!out.exists());
}

#[test]
fn test_malformed_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("parameters.toml");
    fs::write(&config_path, "[paths\nquestions_path = ").unwrap();

    assert!(Config::load(&config_path).is_err());
}

/// 需要真实模型：QA_MODEL_PATH=/path/to/model.gguf cargo test -- --ignored
#[cfg(feature = "llama")]
#[test]
#[ignore]
fn test_real_model_answers() {
    use models_qa::{LlamaRunner, LlmService};

    logger::init(true);

    let model_path = PathBuf::from(std::env::var("QA_MODEL_PATH").expect("需要设置 QA_MODEL_PATH"));
    let config = models_qa::config::LlamaConfig::default();
    let mut runner = LlamaRunner::load(&model_path, &config, false).expect("模型加载失败");

    let service = LlmService::new(&Default::default());
    let answer = service.answer(&mut runner, "What is the capital of France? Answer in one word.");

    let text = answer.result.expect("推理失败");
    println!("回答: {} ({:.0} ms)", text, answer.elapsed_ms);
    assert!(!text.is_empty());
    assert!(answer.elapsed_ms > 0.0);
}
