//! # 批量执行器
//!
//! 在 rayon 线程池上并行执行互不依赖的 slab 任务。
//!
//! ## 功能
//! - `run`: 逐项返回 `ProcessResult`，汇总成功/跳过/失败
//! - `map`: 保持输入顺序收集每项结果（参数扫描用）
//! - 进度条显示
//!
//! ## 依赖关系
//! - 被 `commands/local.rs`, `commands/sweep.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon`, `num_cpus`

use crate::error::{Result, SlabkitError};
use crate::utils::progress;

use rayon::prelude::*;

/// 单个任务的处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    Success(String),
    /// 跳过（如输出已存在）
    Skipped(String),
    /// (任务名, 错误信息)
    Failed(String, String),
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(name, err) => {
                self.failed += 1;
                self.failures.push((name, err));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// `jobs = 0` 时使用全部 CPU 核心
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    fn pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| SlabkitError::Other(format!("Failed to build thread pool: {}", e)))
    }

    /// 并行映射，结果与输入顺序一致
    pub fn map<T, R, F>(&self, items: &[T], message: &str, f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let pb = progress::create_progress_bar(items.len() as u64, message);
        let pool = self.pool()?;

        let results = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let r = f(item);
                    pb.inc(1);
                    r
                })
                .collect()
        });

        pb.finish_and_clear();
        Ok(results)
    }

    /// 并行处理并汇总
    pub fn run<T, F>(&self, items: &[T], processor: F) -> Result<BatchResult>
    where
        T: Sync,
        F: Fn(&T) -> ProcessResult + Sync + Send,
    {
        let results = self.map(items, "Processing", processor)?;

        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }
        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_order() {
        let runner = BatchRunner::new(4);
        let items: Vec<usize> = (0..50).collect();
        let squares = runner.map(&items, "test", |x| x * x).unwrap();
        assert_eq!(squares[7], 49);
        assert_eq!(squares.len(), 50);
    }

    #[test]
    fn test_run_counts_outcomes() {
        let runner = BatchRunner::new(2);
        let items = vec![1, 2, 3, 4];
        let result = runner
            .run(&items, |x| match x % 3 {
                0 => ProcessResult::Failed(x.to_string(), "bad".to_string()),
                1 => ProcessResult::Success(x.to_string()),
                _ => ProcessResult::Skipped(x.to_string()),
            })
            .unwrap();
        assert_eq!(result.success, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total(), 4);
        assert_eq!(result.failures[0].0, "3");
    }

    #[test]
    fn test_zero_jobs_uses_all_cores() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
    }
}
