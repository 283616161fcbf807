//! Filesystem layout of job sources and rendered output

use std::path::{Component, Path, PathBuf};

use crate::domain::Job;

/// Resolves input and output paths for jobs
///
/// ```text
/// <jobs_dir>/jobs-src/<release>/<job>/job.MF
/// <jobs_dir>/jobs-src/<release>/<job>/templates/<source>
/// <output_dir>/<job>/<destination>
/// ```
#[derive(Debug, Clone)]
pub struct JobsLayout {
    jobs_dir: PathBuf,
    output_dir: PathBuf,
}

impl JobsLayout {
    pub fn new(jobs_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            jobs_dir: jobs_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Source directory of a job inside its release
    pub fn job_src_dir(&self, job: &Job) -> PathBuf {
        self.jobs_dir
            .join("jobs-src")
            .join(&job.release)
            .join(&job.name)
    }

    /// Path to the job's `job.MF`
    pub fn job_spec_path(&self, job: &Job) -> PathBuf {
        self.job_src_dir(job).join("job.MF")
    }

    pub fn template_path(&self, job: &Job, source: &str) -> PathBuf {
        self.job_src_dir(job).join("templates").join(source)
    }

    /// Output directory owned by a job
    pub fn job_output_dir(&self, job: &Job) -> PathBuf {
        self.output_dir.join(&job.name)
    }

    /// Absolute destination for a rendered template.
    ///
    /// Returns `None` when `destination` would leave the job's output
    /// directory (absolute paths, `..` components) or does not name a file
    /// inside it (`.`, `etc/.`).
    pub fn destination_path(&self, job: &Job, destination: &str) -> Option<PathBuf> {
        let relative = Path::new(destination);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        let names_file = !destination.ends_with('/')
            && !destination.ends_with("/.")
            && matches!(relative.components().next_back(), Some(Component::Normal(_)));
        if !contained || !names_file {
            return None;
        }
        Some(self.job_output_dir(job).join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            name: "web".to_string(),
            release: "r1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn source_paths() {
        let layout = JobsLayout::new("/jobs", "/out");
        assert_eq!(
            layout.job_spec_path(&job()),
            PathBuf::from("/jobs/jobs-src/r1/web/job.MF")
        );
        assert_eq!(
            layout.template_path(&job(), "conf.erb"),
            PathBuf::from("/jobs/jobs-src/r1/web/templates/conf.erb")
        );
    }

    #[test]
    fn nested_destination() {
        let layout = JobsLayout::new("/jobs", "/out");
        assert_eq!(
            layout.destination_path(&job(), "sub/dir/out"),
            Some(PathBuf::from("/out/web/sub/dir/out"))
        );
    }

    #[test]
    fn escaping_destinations_are_rejected() {
        let layout = JobsLayout::new("/jobs", "/out");
        assert_eq!(layout.destination_path(&job(), "../other/conf"), None);
        assert_eq!(layout.destination_path(&job(), "etc/../../x"), None);
        assert_eq!(layout.destination_path(&job(), "/etc/passwd"), None);
        assert_eq!(layout.destination_path(&job(), ""), None);
    }

    #[test]
    fn destinations_must_name_a_file() {
        let layout = JobsLayout::new("/jobs", "/out");
        assert_eq!(layout.destination_path(&job(), "."), None);
        assert_eq!(layout.destination_path(&job(), "etc/."), None);
        assert_eq!(layout.destination_path(&job(), "etc/"), None);
        assert_eq!(
            layout.destination_path(&job(), "./etc/conf"),
            Some(PathBuf::from("/out/web/./etc/conf"))
        );
    }
}
