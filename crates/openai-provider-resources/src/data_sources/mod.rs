//! Built-in read-only data sources.

mod projects;
mod vector_store_files;

pub use projects::{ProjectsConfig, ProjectsDataSource, ProjectsState};
pub use vector_store_files::{
    VectorStoreFileSummary, VectorStoreFilesConfig, VectorStoreFilesDataSource,
    VectorStoreFilesState,
};
