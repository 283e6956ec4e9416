use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

/// 图片存储后端。
///
/// 路径均为相对存储根的 key（如 `products/<uuid>.webp`）。实现必须保证 `put` 要么完整落盘，
/// 要么不留下任何可见文件。
pub trait ImageStore: Send + Sync {
    /// 确保 collection 目录存在；已存在时为 no-op
    fn ensure_collection(&self, collection: &str) -> io::Result<()>;
    /// 写入完整文件
    fn put(&self, path: &str, bytes: &[u8]) -> io::Result<()>;
    /// 删除文件
    fn delete(&self, path: &str) -> io::Result<()>;
    /// 读取文件
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
    /// 文件是否存在
    fn exists(&self, path: &str) -> bool;
    /// 存储后端当前是否可用（健康检查）
    fn is_available(&self) -> bool {
        true
    }
}

/// 本地磁盘存储（公开目录，由静态文件服务对外暴露）
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 把存储 key 解析为根目录下的绝对路径，拒绝绝对路径与 `..`，避免越出存储根。
    fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        let key = key.trim().trim_start_matches('/');
        if key.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "空的存储路径"));
        }
        let rel = Path::new(key);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("非法的存储路径: {key}"),
            ));
        }
        Ok(self.root.join(rel))
    }
}

impl ImageStore for LocalDiskStore {
    fn ensure_collection(&self, collection: &str) -> io::Result<()> {
        let dir = self.resolve(collection)?;
        fs::create_dir_all(dir)
    }

    fn put(&self, path: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.resolve(path)?;
        let parent = target
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "存储路径缺少父目录"))?;
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "存储路径缺少文件名"))?;

        // 先写同目录临时文件并 fsync，再原子 rename 到目标位置
        let tmp = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
        let result = (|| {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(bytes)?;
            f.sync_all()?;
            fs::rename(&tmp, &target)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(path)?)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path)?)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageStore, LocalDiskStore};
    use uuid::Uuid;

    fn temp_store() -> LocalDiskStore {
        let root = std::env::temp_dir().join(format!("inventory_store_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("create temp root");
        LocalDiskStore::new(root)
    }

    #[test]
    fn put_then_read_and_delete() {
        let store = temp_store();
        store.ensure_collection("products").expect("ensure");
        store.put("products/a.webp", b"abc").expect("put");
        assert!(store.exists("products/a.webp"));
        assert_eq!(store.read("products/a.webp").expect("read"), b"abc");

        store.delete("products/a.webp").expect("delete");
        assert!(!store.exists("products/a.webp"));
    }

    #[test]
    fn ensure_collection_is_idempotent() {
        let store = temp_store();
        store.ensure_collection("suppliers").expect("first");
        store.ensure_collection("suppliers").expect("second");
        assert!(store.root().join("suppliers").is_dir());
        assert!(store.is_available());
        assert!(!LocalDiskStore::new("/definitely/not/a/root").is_available());
    }

    #[test]
    fn put_leaves_no_temp_files() {
        let store = temp_store();
        store.ensure_collection("products").expect("ensure");
        store.put("products/b.webp", b"xyz").expect("put");
        let names: Vec<String> = std::fs::read_dir(store.root().join("products"))
            .expect("read dir")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.webp".to_string()]);
    }

    #[test]
    fn put_without_collection_dir_fails_cleanly() {
        let store = temp_store();
        assert!(store.put("missing/c.webp", b"1").is_err());
        assert!(!store.root().join("missing").exists());
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let store = temp_store();
        assert!(store.put("../escape.webp", b"x").is_err());
        assert!(store.delete("products/../../etc/passwd").is_err());
        assert!(!store.exists("/etc/passwd"));
        assert!(store.read("").is_err());
    }
}
