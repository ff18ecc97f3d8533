//! Subcommands, one per ledger operation

use clap::Subcommand;
use dpp_engine::{DppLedger, RecordTransformation};
use dpp_types::{
    NewDpp, QualitySpecification, QualitySubmission, TransportLogAnchor, TransportSubmission,
};
use serde_json::{json, Value};

use crate::payload;

/// Ledger subcommands. JSON arguments accept inline JSON or `@file`.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a passport owned by the calling organization
    Create {
        /// Record id
        id: String,

        /// GS1 product identifier URN, e.g. urn:epc:id:sgtin:4012345.011111.1001
        #[arg(long)]
        product_identifier: String,

        /// GLN of the manufacturing site
        #[arg(long)]
        site: String,

        /// Product type
        #[arg(long, default_value = "")]
        product_type: String,

        /// Batch or lot number
        #[arg(long, default_value = "")]
        batch: String,

        /// Production date
        #[arg(long, default_value = "")]
        production_date: String,

        /// Quality specifications (JSON array)
        #[arg(long)]
        specs: Option<String>,
    },

    /// Record a quality test result
    RecordQuality {
        /// Record id
        id: String,

        /// Quality entry (JSON object)
        #[arg(long)]
        entry: String,

        /// GLN of the site where the test ran
        #[arg(long)]
        site: String,
    },

    /// Append a transport condition reading
    TransportUpdate {
        /// Record id
        id: String,

        /// Transport entry (JSON object)
        #[arg(long)]
        entry: String,

        /// GLN of the reporting site
        #[arg(long)]
        site: String,
    },

    /// Anchor an off-chain transport log
    AnchorLog {
        /// Record id
        id: String,

        /// Reference to the off-chain log file
        #[arg(long)]
        log_ref: String,

        /// The log contains alarms
        #[arg(long)]
        alarm: bool,

        /// System that produced the log
        #[arg(long)]
        system: Option<String>,

        /// Free-form note
        #[arg(long)]
        note: Option<String>,

        /// GLN of the anchoring site
        #[arg(long)]
        site: String,
    },

    /// Consume input passports into a new output passport
    Transform {
        /// Output passport (JSON object with the `create` fields)
        #[arg(long)]
        output: String,

        /// Input record ids (JSON array)
        #[arg(long)]
        inputs: String,

        /// Initial observation on the output (JSON quality entry)
        #[arg(long)]
        initial_quality: Option<String>,
    },

    /// Ship a passport to another organization
    Transfer {
        /// Record id
        id: String,

        /// Receiving organization
        #[arg(long)]
        to: String,

        /// GLN of the shipping site
        #[arg(long)]
        site: String,
    },

    /// Acknowledge receipt of an in-transit passport
    Acknowledge {
        /// Record id
        id: String,

        /// GLN of the receiving site
        #[arg(long)]
        site: String,

        /// Incoming inspection (JSON quality entry)
        #[arg(long)]
        inspection: Option<String>,
    },

    /// Refuse an in-transit passport
    Reject {
        /// Record id
        id: String,

        /// GLN of the receiving site
        #[arg(long)]
        site: String,

        /// Reason for the rejection
        #[arg(long)]
        reason: String,
    },

    /// Show a passport
    Query {
        /// Record id
        id: String,
    },
}

/// Execute a command and return the document to print.
pub fn execute(command: Commands, ledger: &DppLedger) -> anyhow::Result<Value> {
    let dpp = match command {
        Commands::Create {
            id,
            product_identifier,
            site,
            product_type,
            batch,
            production_date,
            specs,
        } => {
            let specifications: Option<Vec<QualitySpecification>> =
                payload::parse_opt(specs.as_deref())?;
            ledger.create_record(NewDpp {
                id,
                product_identifier,
                product_type_id: product_type,
                manufacturer_site_id: site,
                batch,
                production_date,
                specifications: specifications.unwrap_or_default(),
            })?
        }

        Commands::RecordQuality { id, entry, site } => {
            let submission: QualitySubmission = payload::parse(&entry)?;
            ledger.record_quality(&id, submission, &site)?
        }

        Commands::TransportUpdate { id, entry, site } => {
            let submission: TransportSubmission = payload::parse(&entry)?;
            ledger.add_transport_update(&id, submission, &site)?
        }

        Commands::AnchorLog {
            id,
            log_ref,
            alarm,
            system,
            note,
            site,
        } => {
            let anchor = TransportLogAnchor {
                off_chain_log_ref: log_ref,
                alarm_summary: alarm,
                responsible_system: system,
                note,
            };
            ledger.anchor_transport_log(&id, anchor, &site)?
        }

        Commands::Transform {
            output,
            inputs,
            initial_quality,
        } => {
            let request = RecordTransformation {
                output: payload::parse(&output)?,
                input_record_ids: payload::parse(&inputs)?,
                initial_quality: payload::parse_opt(initial_quality.as_deref())?,
            };
            let result = ledger.record_transformation(request)?;
            return Ok(json!({
                "output": result.output,
                "consumedInputs": result.consumed_inputs,
                "ineligibleInputs": result.ineligible_inputs,
            }));
        }

        Commands::Transfer { id, to, site } => ledger.transfer_record(&id, &to, &site)?,

        Commands::Acknowledge {
            id,
            site,
            inspection,
        } => {
            let inspection: Option<QualitySubmission> = payload::parse_opt(inspection.as_deref())?;
            ledger.acknowledge_receipt(&id, &site, inspection)?
        }

        Commands::Reject { id, site, reason } => ledger.reject_delivery(&id, &site, &reason)?,

        Commands::Query { id } => ledger.query_record(&id)?,
    };

    Ok(serde_json::to_value(&dpp)?)
}
