//! Interactive selection of configuration operations.
//!
//! The selector walks the operator through the same yes/no questions for
//! every setting group (properties, management, metrics, permissions) and
//! turns the answers into an explicit list of [`OperationRequest`]s. Nothing is
//! applied here; the list is handed to the applier afterwards.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Result, anyhow};

use crate::catalog::OperationRequest;
use crate::catalog::management::{INVENTORY_REPORT, LIFECYCLE_POLICY, REPLICATION_RULE};
use crate::catalog::metrics::STORAGE_CLASS_ANALYSIS;
use crate::catalog::permissions::{
    CORS_RULE, OBJECT_OWNERSHIP, PRIVATE_ACL, PUBLIC_ACCESS_BLOCK, SECURE_TRANSPORT_POLICY,
};
use crate::catalog::properties::{
    ACCESS_LOGGING, ENCRYPTION, REQUESTER_PAYS, TRANSFER_ACCELERATION, VERSIONING_ENABLE,
};
use crate::types::ResourceRef;
use crate::types::error::S3confError;

// ---------------------------------------------------------------------------
// PromptHandler trait (for testability)
// ---------------------------------------------------------------------------

/// Source of operator answers.
///
/// The default implementation ([`StdioPromptHandler`]) uses stdin/stdout.
/// Tests provide scripted implementations.
pub trait PromptHandler: Send + Sync {
    /// Display `question` and return the trimmed answer.
    fn ask(&self, question: &str) -> Result<String>;

    /// Returns `true` if both stdin and stdout are connected to a TTY.
    fn is_interactive(&self) -> bool;
}

/// Prompts on stdout with `print!`, answers read from stdin.
pub struct StdioPromptHandler;

impl PromptHandler for StdioPromptHandler {
    fn ask(&self, question: &str) -> Result<String> {
        print!("{question} ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }
}

// ---------------------------------------------------------------------------
// InteractiveSelector
// ---------------------------------------------------------------------------

pub struct InteractiveSelector {
    prompt_handler: Box<dyn PromptHandler>,
}

impl Default for InteractiveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveSelector {
    pub fn new() -> Self {
        Self::with_prompt_handler(Box::new(StdioPromptHandler))
    }

    pub fn with_prompt_handler(prompt_handler: Box<dyn PromptHandler>) -> Self {
        Self { prompt_handler }
    }

    /// Ask every setting question for `target` and collect the chosen
    /// operations in question order.
    ///
    /// Fails with [`S3confError::InvalidConfig`] when no terminal is attached.
    pub fn select(&self, target: &ResourceRef) -> Result<Vec<OperationRequest>> {
        self.ensure_interactive()?;

        let mut requests = Vec::new();
        self.select_properties(&mut requests)?;
        self.select_management(target, &mut requests)?;
        self.select_metrics(&mut requests)?;
        self.select_permissions(&mut requests)?;
        Ok(requests)
    }

    /// A `(y/N)` question. Anything but `y` is a no.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        self.ensure_interactive()?;
        self.yes(question)
    }

    fn ensure_interactive(&self) -> Result<()> {
        if !self.prompt_handler.is_interactive() {
            return Err(anyhow!(S3confError::InvalidConfig(
                "interactive selection requires a terminal; pass operation flags instead"
                    .to_string()
            )));
        }
        Ok(())
    }

    fn select_properties(&self, requests: &mut Vec<OperationRequest>) -> Result<()> {
        if self.yes("Enable versioning?")? {
            requests.push(OperationRequest::new(VERSIONING_ENABLE));
        }
        if self.yes("Enable encryption?")? {
            requests.push(OperationRequest::new(ENCRYPTION));
        }
        if self.yes("Enable transfer acceleration?")? {
            requests.push(OperationRequest::new(TRANSFER_ACCELERATION));
        }
        if self.yes("Enable requester pays?")? {
            requests.push(OperationRequest::new(REQUESTER_PAYS));
        }
        if self.yes("Enable access logging?")? {
            let log_bucket = self.required_text("Enter the target bucket for logging:")?;
            requests.push(
                OperationRequest::new(ACCESS_LOGGING).with_param("target-bucket", log_bucket),
            );
        }
        Ok(())
    }

    fn select_management(
        &self,
        target: &ResourceRef,
        requests: &mut Vec<OperationRequest>,
    ) -> Result<()> {
        if self.yes("Do you want to apply Lifecycle Configuration?")? {
            requests.push(OperationRequest::new(LIFECYCLE_POLICY));
        }
        if self.yes("Do you want to apply Replication Rules?")? {
            let destination =
                self.required_text("Enter the destination bucket for replication:")?;
            let account_id =
                self.required_text("Enter the AWS account ID that owns the replication role:")?;

            let question = format!(
                "Replication requires versioning. Enable versioning on '{}' and '{}'?",
                target.name(),
                destination
            );
            if self.yes(&question)? {
                if !requests
                    .iter()
                    .any(|r| r.operation == VERSIONING_ENABLE && r.param("bucket").is_none())
                {
                    requests.push(OperationRequest::new(VERSIONING_ENABLE));
                }
                requests.push(
                    OperationRequest::new(VERSIONING_ENABLE)
                        .with_param("bucket", destination.as_str()),
                );
            }

            requests.push(
                OperationRequest::new(REPLICATION_RULE)
                    .with_param("destination", destination)
                    .with_param("account-id", account_id),
            );
        }
        if self.yes("Do you want to apply Inventory Configuration?")? {
            requests.push(OperationRequest::new(INVENTORY_REPORT));
        }
        Ok(())
    }

    fn select_metrics(&self, requests: &mut Vec<OperationRequest>) -> Result<()> {
        if self.yes("Do you want to enable Storage Class Analysis on this bucket?")? {
            let destination =
                self.required_text("Enter the destination bucket for analytics data:")?;
            let prefix = self.prompt_handler.ask(
                "Enter a prefix to analyze (or press Enter for full bucket analysis):",
            )?;

            let mut request =
                OperationRequest::new(STORAGE_CLASS_ANALYSIS).with_param("destination", destination);
            if !prefix.is_empty() {
                request = request.with_param("prefix", prefix);
            }
            requests.push(request);
        }
        Ok(())
    }

    fn select_permissions(&self, requests: &mut Vec<OperationRequest>) -> Result<()> {
        if self.yes("Block public access?")? {
            requests.push(OperationRequest::new(PUBLIC_ACCESS_BLOCK));
        }
        if self.yes("Set a bucket policy for secure transport?")? {
            requests.push(OperationRequest::new(SECURE_TRANSPORT_POLICY));
        }
        if self.yes("Set object ownership to Bucket Owner Enforced?")? {
            requests.push(OperationRequest::new(OBJECT_OWNERSHIP).with_param("ownership", "enforced"));
        }
        if self.yes("Set ACL to private?")? {
            requests.push(OperationRequest::new(PRIVATE_ACL));
        }
        if self.yes("Configure CORS for cross-origin access?")? {
            requests.push(OperationRequest::new(CORS_RULE));
        }
        Ok(())
    }

    fn yes(&self, question: &str) -> Result<bool> {
        let answer = self.prompt_handler.ask(&format!("{question} (y/N):"))?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    fn required_text(&self, question: &str) -> Result<String> {
        let answer = self.prompt_handler.ask(question)?;
        if answer.is_empty() {
            return Err(anyhow!(S3confError::InvalidConfig(format!(
                "no answer given to: {question}"
            ))));
        }
        Ok(answer)
    }
}
