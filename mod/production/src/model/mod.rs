pub mod checkpoint;
pub mod history;
pub mod instruction;
pub mod machine;
pub mod qc;
pub mod qrcode;
pub mod worker;
pub mod workorder;

pub use checkpoint::{CheckPoint, CreateCheckPoint};
pub use history::{BundleHistoryRecord, STATUS_PASSED};
pub use instruction::{CreateInstruction, Instruction};
pub use machine::{CreateMachine, Machine, MachineStatus};
pub use qc::{QcChecklist, QcChecklistItem, QcFailure, QcItemResult, QcOutcome, QcReport};
pub use qrcode::{QrCode, STATUS_UNASSIGNED};
pub use worker::{CreateWorker, Worker};
pub use workorder::{CreateWorkOrder, WorkOrder};
