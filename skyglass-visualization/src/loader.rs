//! Background mesh loading
//!
//! The mesh is read and built on a worker thread and handed back over a
//! channel, so the render loop keeps running while a large file loads.

use std::path::PathBuf;
use std::thread;

use flume::{Receiver, TryRecvError};
use skyglass_core::{Error, Result, TriangleMesh};
use skyglass_io::ObjReadOptions;
use tracing::{info, warn};

/// State of a background load as seen from the render loop
#[derive(Debug)]
pub enum LoadStatus {
    /// Still reading or building
    Pending,
    /// The mesh is built and ready to upload
    Ready(TriangleMesh),
    /// Reading or building failed
    Failed(Error),
}

/// Starts background mesh loads
pub struct MeshLoader;

impl MeshLoader {
    /// Read and build the mesh at `path` on a worker thread
    pub fn spawn(path: impl Into<PathBuf>, options: ObjReadOptions) -> Result<PendingMesh> {
        let path = path.into();
        let source = path.display().to_string();
        Self::spawn_job(source, move || {
            skyglass_io::read_mesh_with(&path, &options)
        })
    }

    /// Build a mesh from OBJ text on a worker thread
    pub fn spawn_from_str(text: impl Into<String>, options: ObjReadOptions) -> Result<PendingMesh> {
        let text = text.into();
        Self::spawn_job("<memory>".to_string(), move || {
            skyglass_io::load_mesh_from_str_with(&text, &options)
        })
    }

    fn spawn_job<F>(source: String, job: F) -> Result<PendingMesh>
    where
        F: FnOnce() -> Result<TriangleMesh> + Send + 'static,
    {
        let (sender, receiver) = flume::bounded(1);
        let label = source.clone();

        thread::Builder::new()
            .name("skyglass-mesh-loader".to_string())
            .spawn(move || {
                let result = job();
                match &result {
                    Ok(mesh) => info!(
                        source = %label,
                        vertices = mesh.vertex_count(),
                        faces = mesh.face_count(),
                        edges = mesh.edge_count(),
                        "mesh loaded"
                    ),
                    Err(e) => warn!(source = %label, error = %e, "mesh load failed"),
                }
                // The receiver may already be gone if the viewer closed.
                let _ = sender.send(result);
            })?;

        Ok(PendingMesh {
            source,
            receiver,
            finished: false,
        })
    }
}

/// Handle to a mesh being loaded in the background
#[derive(Debug)]
pub struct PendingMesh {
    source: String,
    receiver: Receiver<Result<TriangleMesh>>,
    finished: bool,
}

impl PendingMesh {
    /// Where the mesh is coming from, for display
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True once `poll` or `wait` has returned a final status
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Check for a result without blocking. After a final status has been
    /// returned, further polls report `Pending`.
    pub fn poll(&mut self) -> LoadStatus {
        if self.finished {
            return LoadStatus::Pending;
        }
        match self.receiver.try_recv() {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => self.finish(Err(Self::lost_worker())),
        }
    }

    /// Block until the load finishes
    pub fn wait(mut self) -> Result<TriangleMesh> {
        self.finished = true;
        self.receiver.recv().map_err(|_| Self::lost_worker())?
    }

    fn finish(&mut self, result: Result<TriangleMesh>) -> LoadStatus {
        self.finished = true;
        match result {
            Ok(mesh) => LoadStatus::Ready(mesh),
            Err(e) => LoadStatus::Failed(e),
        }
    }

    fn lost_worker() -> Error {
        Error::InvalidState("mesh loader stopped without a result".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn poll_until_done(pending: &mut PendingMesh) -> LoadStatus {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match pending.poll() {
                LoadStatus::Pending if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5));
                }
                status => return status,
            }
        }
    }

    #[test]
    fn test_load_from_text_becomes_ready() {
        let mut pending = MeshLoader::spawn_from_str(TRIANGLE, ObjReadOptions::default()).unwrap();
        match poll_until_done(&mut pending) {
            LoadStatus::Ready(mesh) => {
                assert!(mesh.is_ready());
                assert_eq!(mesh.face_count(), 1);
                assert_eq!(mesh.edge_count(), 3);
            }
            other => panic!("expected a ready mesh, got {:?}", other),
        }
        assert!(pending.is_finished());
        assert!(matches!(pending.poll(), LoadStatus::Pending));
    }

    #[test]
    fn test_bad_text_reports_failure() {
        let mut pending =
            MeshLoader::spawn_from_str("v 0 0 0\nf 1 2 3\n", ObjReadOptions::default()).unwrap();
        assert!(matches!(
            poll_until_done(&mut pending),
            LoadStatus::Failed(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_from_file_and_wait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.obj");
        std::fs::write(&path, TRIANGLE).unwrap();

        let pending = MeshLoader::spawn(&path, ObjReadOptions::default()).unwrap();
        assert!(pending.source().ends_with("triangle.obj"));
        let mesh = pending.wait().unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_missing_file_fails() {
        let pending = MeshLoader::spawn("does/not/exist.obj", ObjReadOptions::default()).unwrap();
        assert!(matches!(pending.wait(), Err(Error::Io(_))));
    }
}
