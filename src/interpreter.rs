use std::collections::HashMap;

use crate::ast::{Program, Statement};
use crate::error::{PissError, PissResult};
use crate::logging::{LogLevel, LogRecord, LoggerCore};
use crate::token::{Token, TokenKind, Verb};
use crate::value::{MemoryFault, Tub, Value};

const LOG_TARGET: &str = "pisscript::interpreter";

/// Why a run stopped before the last statement
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// Something the diagnostic reporter can explain
    Error(PissError),
    /// A Tub went negative. Not reported, the process just dies.
    Fault { fault: MemoryFault, line: usize },
}

impl From<PissError> for Halt {
    fn from(error: PissError) -> Self {
        Halt::Error(error)
    }
}

/// The interpreter - runs Pisscript programs one statement at a time
pub struct Interpreter {
    tubs: HashMap<String, Tub>,
    program_counter: usize,
    /// Line of the statement being executed, for errors and logs
    line: usize,
    output: Vec<String>,
    logger: LoggerCore,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_logger(LoggerCore::from_env())
    }

    pub fn with_logger(logger: LoggerCore) -> Self {
        Interpreter {
            tubs: HashMap::new(),
            program_counter: 0,
            line: 0,
            output: Vec::new(),
            logger,
        }
    }

    /// Run every statement in order. Tubs survive between calls; the
    /// program counter starts again from the top.
    pub fn interpret(&mut self, program: &Program) -> Result<(), Halt> {
        self.program_counter = 0;
        self.log(
            LogLevel::Info,
            "run started",
            &[("statements", program.len().to_string())],
        );

        while let Some(statement) = program.statements.get(self.program_counter) {
            self.line = statement.line;
            if let Err(halt) = self.execute(statement) {
                match &halt {
                    Halt::Error(error) => {
                        self.log(LogLevel::Debug, "run failed", &[("error", error.to_string())])
                    }
                    Halt::Fault { fault, .. } => self.log(
                        LogLevel::Error,
                        "memory fault",
                        &[("value", fault.value.to_string())],
                    ),
                }
                return Err(halt);
            }
            self.program_counter += 1;
        }

        self.log(
            LogLevel::Info,
            "run completed",
            &[("tubs", self.tubs.len().to_string())],
        );
        Ok(())
    }

    /// Get captured output (for testing)
    pub fn get_output(&self) -> &[String] {
        &self.output
    }

    pub fn get_tub(&self, name: &str) -> Option<&Tub> {
        self.tubs.get(name)
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn logger(&self) -> &LoggerCore {
        &self.logger
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), Halt> {
        if self.logger.enabled(LogLevel::Trace, LOG_TARGET) {
            let args = statement
                .args
                .iter()
                .map(|arg| arg.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            self.log(
                LogLevel::Trace,
                "statement",
                &[("verb", statement.verb.to_string()), ("args", args)],
            );
        }

        match statement.verb {
            Verb::Tub => self.declare(statement),
            Verb::Ejaculate => self.output_value(statement),
            Verb::Fill => self.fill(statement),
            Verb::Pour => self.pour(statement),
            Verb::Measure => self.measure(statement),
            Verb::Stick => self.stick(statement),
        }
    }

    /// tub <name>
    fn declare(&mut self, statement: &Statement) -> Result<(), Halt> {
        let name = self.arg(statement, 0, "Expected Tub name")?;
        if name.kind != TokenKind::Name {
            return Err(PissError::WrongTokenKind {
                expected: TokenKind::Name.name(),
                found: name.text.clone(),
                line: self.line,
            }
            .into());
        }
        if self.tubs.contains_key(&name.text) {
            return Err(PissError::TubAlreadyExists {
                name: name.text.clone(),
                line: self.line,
            }
            .into());
        }

        self.tubs.insert(name.text.clone(), Tub::new());
        self.log(LogLevel::Debug, "tub declared", &[("tub", name.text.clone())]);
        Ok(())
    }

    /// ejaculate <value>
    fn output_value(&mut self, statement: &Statement) -> Result<(), Halt> {
        let load = self.arg(statement, 0, "Expected value (need something to ejaculate!)")?;
        let value = self.resolve(load)?;

        let output = value.to_string();
        println!("{}", output);
        self.output.push(output);
        Ok(())
    }

    /// fill <tub> with <value>
    fn fill(&mut self, statement: &Statement) -> Result<(), Halt> {
        let target = self.arg(statement, 0, "Expected Tub name")?;
        let with = self.arg(statement, 1, "Expected 'with'")?;
        let fill = self.arg(statement, 2, "Expected value")?;

        self.find_tub(&target.text)?;
        self.expect_keyword(with, "with")?;
        let value = self.resolve(fill)?;

        self.store(&target.text, value)
    }

    /// pour <value> into <tub>
    ///
    /// Pouring empties the source: if the value came out of a Tub, that Tub
    /// is left at 0 before the target is topped up. Pouring a Tub into
    /// itself therefore changes nothing.
    fn pour(&mut self, statement: &Statement) -> Result<(), Halt> {
        let source = self.arg(statement, 0, "Expected value")?;
        let into = self.arg(statement, 1, "Expected 'into'")?;
        let target = self.arg(statement, 2, "Expected Tub")?;

        if self.find_tub(&target.text)?.value().as_words().is_some() {
            return Err(PissError::PourIntoWords { line: self.line }.into());
        }
        self.expect_keyword(into, "into")?;
        let Value::Number(amount) = self.resolve(source)? else {
            return Err(PissError::PourWords { line: self.line }.into());
        };

        if source.kind == TokenKind::Name {
            self.find_tub_mut(&source.text)?.drain();
        }

        let current = match self.find_tub(&target.text)?.value() {
            Value::Number(n) => *n,
            Value::Words(_) => return Err(PissError::PourIntoWords { line: self.line }.into()),
        };
        self.store(&target.text, Value::Number(current + amount))
    }

    /// measure <tub>
    fn measure(&mut self, statement: &Statement) -> Result<(), Halt> {
        let target = self.arg(statement, 0, "Expected Tub")?;

        let measured = match self.find_tub(&target.text)?.value() {
            Value::Number(n) => Value::Number(*n).to_string(),
            Value::Words(_) => return Err(PissError::MeasureWords { line: self.line }.into()),
        };

        self.store(&target.text, Value::Words(measured))
    }

    /// stick <words> onto <tub>
    fn stick(&mut self, statement: &Statement) -> Result<(), Halt> {
        let appendage = self.resolve(self.arg(statement, 0, "Expected Words")?)?;
        let onto = self.arg(statement, 1, "Expected 'onto'")?;
        let target = self.arg(statement, 2, "Expected Tub")?;

        self.find_tub(&target.text)?;
        self.expect_keyword(onto, "onto")?;
        let Value::Words(words) = appendage else {
            return Err(PissError::AppendNumber { line: self.line }.into());
        };

        let stuck = self.find_tub(&target.text)?.value().append(&words);
        self.store(&target.text, stuck)
    }

    /// Work out what a token stands for
    fn resolve(&self, token: &Token) -> PissResult<Value> {
        match token.kind {
            TokenKind::Name => Ok(self.find_tub(&token.text)?.value().clone()),
            // Only digits get here, and a digit run always parses. Too many
            // of them overflow to infinity rather than failing.
            TokenKind::Number => Ok(Value::Number(
                token.text.parse().unwrap_or(f64::INFINITY),
            )),
            TokenKind::String => Ok(Value::Words(token.text.clone())),
            TokenKind::Verb => Err(PissError::UnexpectedKeyword {
                keyword: token.text.clone(),
                line: self.line,
            }),
            TokenKind::Endl | TokenKind::Eof => Err(PissError::CannotResolve {
                token: token.text.clone(),
                line: self.line,
            }),
        }
    }

    /// Put a value in a Tub. This is where negative numbers blow up.
    fn store(&mut self, name: &str, value: Value) -> Result<(), Halt> {
        let line = self.line;
        self.find_tub_mut(name)?
            .set(value)
            .map_err(|fault| Halt::Fault { fault, line })?;

        if self.logger.enabled(LogLevel::Debug, LOG_TARGET) {
            let value = self.find_tub(name)?.value().to_string();
            self.log(
                LogLevel::Debug,
                "tub filled",
                &[("tub", name.to_string()), ("value", value)],
            );
        }
        Ok(())
    }

    fn arg<'a>(
        &self,
        statement: &'a Statement,
        n: usize,
        expected: &'static str,
    ) -> PissResult<&'a Token> {
        statement.arg(n).ok_or(PissError::MissingArgument {
            expected,
            line: self.line,
        })
    }

    fn expect_keyword(&self, token: &Token, keyword: &'static str) -> PissResult<()> {
        if token.text == keyword {
            Ok(())
        } else {
            Err(PissError::ExpectedKeyword {
                keyword,
                line: self.line,
            })
        }
    }

    fn find_tub(&self, name: &str) -> PissResult<&Tub> {
        self.tubs.get(name).ok_or_else(|| PissError::NoSuchTub {
            name: name.to_string(),
            line: self.line,
        })
    }

    fn find_tub_mut(&mut self, name: &str) -> PissResult<&mut Tub> {
        let line = self.line;
        self.tubs.get_mut(name).ok_or_else(|| PissError::NoSuchTub {
            name: name.to_string(),
            line,
        })
    }

    fn log(&mut self, level: LogLevel, message: &str, fields: &[(&'static str, String)]) {
        if !self.logger.enabled(level, LOG_TARGET) {
            return;
        }
        let mut record = LogRecord::new(level, LOG_TARGET, message).at_line(self.line);
        for (key, value) in fields {
            record = record.field(*key, value);
        }
        self.logger.log(&record);
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFilter;
    use crate::parser::parse;
    use crate::value::ValueKind;

    fn quiet() -> Interpreter {
        Interpreter::with_logger(LoggerCore::in_memory(LogFilter::new(LogLevel::Off)))
    }

    fn run(source: &str) -> (Interpreter, Result<(), Halt>) {
        let program = parse(source).unwrap();
        let mut interp = quiet();
        let result = interp.interpret(&program);
        (interp, result)
    }

    fn output_of(source: &str) -> Vec<String> {
        let (interp, result) = run(source);
        result.unwrap();
        interp.get_output().to_vec()
    }

    fn error_of(source: &str) -> PissError {
        match run(source).1 {
            Err(Halt::Error(error)) => error,
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_tub_is_zero() {
        assert_eq!(output_of("tub x\nejaculate x"), ["0"]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            output_of("ejaculate 42\nejaculate \"flush\""),
            ["42", "flush"]
        );
    }

    #[test]
    fn test_huge_literal_is_infinite() {
        let huge = "9".repeat(400);
        assert_eq!(output_of(&format!("ejaculate {}", huge)), ["inf"]);

        let (interp, result) = run(&format!("tub x\nfill x with {}", huge));
        result.unwrap();
        assert_eq!(
            interp.get_tub("x").unwrap().value(),
            &Value::Number(f64::INFINITY)
        );
    }

    #[test]
    fn test_fill() {
        let (interp, result) = run("tub x\nfill x with 5");
        result.unwrap();
        assert_eq!(interp.get_tub("x").unwrap().value(), &Value::Number(5.0));

        let (interp, result) = run("tub x\nfill x with \"soap\"");
        result.unwrap();
        assert_eq!(interp.get_tub("x").unwrap().kind(), ValueKind::Words);
    }

    #[test]
    fn test_fill_from_another_tub() {
        let out = output_of("tub a\nfill a with 9\ntub b\nfill b with a\nejaculate b\nejaculate a");
        assert_eq!(out, ["9", "9"]);
    }

    #[test]
    fn test_pour_moves_and_drains() {
        let out = output_of(
            "tub x\nfill x with 3\ntub y\nfill y with 4\npour x into y\nejaculate y\nejaculate x",
        );
        assert_eq!(out, ["7", "0"]);
    }

    #[test]
    fn test_self_pour_keeps_amount() {
        assert_eq!(
            output_of("tub x\nfill x with 5\npour x into x\nejaculate x"),
            ["5"]
        );
    }

    #[test]
    fn test_pour_literal() {
        assert_eq!(
            output_of("tub x\npour 2 into x\npour 3 into x\nejaculate x"),
            ["5"]
        );
    }

    #[test]
    fn test_pour_into_words() {
        let err = error_of("tub x\nfill x with \"hi\"\npour x into x");
        assert_eq!(err, PissError::PourIntoWords { line: 3 });
    }

    #[test]
    fn test_pour_words() {
        let err = error_of("tub x\ntub w\nfill w with \"hi\"\npour w into x");
        assert_eq!(err, PissError::PourWords { line: 4 });

        let (interp, _) = run("tub x\ntub w\nfill w with \"hi\"\npour w into x");
        assert_eq!(interp.get_tub("w").unwrap().value(), &Value::from("hi"));
    }

    #[test]
    fn test_measure() {
        let (interp, result) = run("tub x\nmeasure x\nejaculate x");
        result.unwrap();
        assert_eq!(interp.get_output(), ["0"]);
        assert_eq!(interp.get_tub("x").unwrap().value(), &Value::from("0"));
    }

    #[test]
    fn test_measure_twice() {
        let err = error_of("tub x\nmeasure x\nmeasure x");
        assert_eq!(err, PissError::MeasureWords { line: 3 });
        assert_eq!(err.to_string(), "Cannnot measure Tub containing Words");
    }

    #[test]
    fn test_stick() {
        let out = output_of(
            "tub x\nfill x with \"toilet\"\nstick \" paper\" onto x\nejaculate x",
        );
        assert_eq!(out, ["toilet paper"]);
    }

    #[test]
    fn test_stick_onto_number() {
        assert_eq!(
            output_of("tub x\nfill x with 2\nstick \"ply\" onto x\nejaculate x"),
            ["2ply"]
        );
    }

    #[test]
    fn test_stick_number() {
        let err = error_of("tub x\nstick 5 onto x");
        assert_eq!(err, PissError::AppendNumber { line: 2 });
    }

    #[test]
    fn test_redeclare() {
        let err = error_of("tub x\n\ntub x");
        assert_eq!(
            err,
            PissError::TubAlreadyExists {
                name: "x".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn test_declare_needs_a_name() {
        assert_eq!(
            error_of("tub"),
            PissError::MissingArgument {
                expected: "Expected Tub name",
                line: 1
            }
        );
        assert_eq!(
            error_of("tub 5"),
            PissError::WrongTokenKind {
                expected: "name",
                found: "5".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_missing_arguments_in_order() {
        let expected = |source| match error_of(source) {
            PissError::MissingArgument { expected, .. } => expected,
            other => panic!("unexpected {:?}", other),
        };

        assert_eq!(expected("ejaculate"), "Expected value (need something to ejaculate!)");
        assert_eq!(expected("fill"), "Expected Tub name");
        assert_eq!(expected("fill x"), "Expected 'with'");
        assert_eq!(expected("fill x with"), "Expected value");
        assert_eq!(expected("pour"), "Expected value");
        assert_eq!(expected("pour 1"), "Expected 'into'");
        assert_eq!(expected("pour 1 into"), "Expected Tub");
        assert_eq!(expected("measure"), "Expected Tub");
        assert_eq!(expected("stick"), "Expected Words");
        assert_eq!(expected("stick \"a\""), "Expected 'onto'");
        assert_eq!(expected("stick \"a\" onto"), "Expected Tub");
    }

    #[test]
    fn test_wrong_keywords() {
        assert_eq!(
            error_of("tub x\nfill x wiv 1"),
            PissError::ExpectedKeyword {
                keyword: "with",
                line: 2
            }
        );
        assert_eq!(
            error_of("tub x\npour 1 onto x"),
            PissError::ExpectedKeyword {
                keyword: "into",
                line: 2
            }
        );
        assert_eq!(
            error_of("tub x\nstick \"a\" into x"),
            PissError::ExpectedKeyword {
                keyword: "onto",
                line: 2
            }
        );
    }

    #[test]
    fn test_unknown_tub() {
        assert_eq!(
            error_of("ejaculate ghost"),
            PissError::NoSuchTub {
                name: "ghost".to_string(),
                line: 1
            }
        );
        // The target is looked up before the keyword is checked
        assert!(matches!(
            error_of("fill ghost wiv 1"),
            PissError::NoSuchTub { .. }
        ));
    }

    #[test]
    fn test_keyword_cannot_be_resolved() {
        assert_eq!(
            error_of("ejaculate pour"),
            PissError::UnexpectedKeyword {
                keyword: "pour".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        assert_eq!(output_of("ejaculate 1 2 3"), ["1"]);
    }

    #[test]
    fn test_execution_stops_at_error() {
        let (interp, result) = run("ejaculate 1\nejaculate nope\nejaculate 3");
        assert!(result.is_err());
        assert_eq!(interp.get_output(), ["1"]);
        assert_eq!(interp.program_counter(), 1);
    }

    #[test]
    fn test_negative_store_is_a_fault() {
        let mut interp = quiet();
        interp.tubs.insert("x".to_string(), Tub::new());
        interp.line = 7;

        let halt = interp.store("x", Value::Number(-2.0)).unwrap_err();
        assert_eq!(
            halt,
            Halt::Fault {
                fault: MemoryFault { value: -2.0 },
                line: 7
            }
        );
        assert_eq!(interp.get_tub("x").unwrap().value(), &Value::Number(0.0));
    }

    #[test]
    fn test_trace_logging() {
        let program = parse("tub x\nfill x with 2").unwrap();
        let mut interp =
            Interpreter::with_logger(LoggerCore::in_memory(LogFilter::new(LogLevel::Trace)));
        interp.interpret(&program).unwrap();

        let entries = interp.logger().entries();
        assert_eq!(entries[0], "[INFO] run started statements=2");
        assert!(entries.contains(&"[TRACE] statement verb=fill args=x with 2".to_string()));
        assert!(entries.contains(&"[DEBUG] tub declared tub=x".to_string()));
        assert!(entries.contains(&"[DEBUG] tub filled tub=x value=2".to_string()));
        assert_eq!(entries.last().unwrap(), "[INFO] run completed tubs=1");
    }
}
