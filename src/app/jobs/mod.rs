pub mod catalog_job;
pub mod certificate_job;
pub mod programs_job;

pub use catalog_job::CatalogJob;
pub use certificate_job::{CertificateBatch, CertificateJob};
pub use programs_job::ProgramsJob;
