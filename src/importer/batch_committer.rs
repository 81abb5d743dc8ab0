// ==========================================
// POS现场运维系统 - 批量提交器实现
// ==========================================
// 口径: 按原始顺序切成定长批次，逐批顺序提交（不并发），
//       单批失败只影响该批，下一批照常继续
// 进度: 每批完成后更新 ceil(done/total*100)，批间可观察
// 取消: 协作取消标志在批间检查（批间是天然暂停点）
// ==========================================

use crate::domain::record::{ImportResult, RowError, TransformedRecord};
use crate::domain::types::EntityType;
use crate::repository::record_store::RecordStore;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 推荐默认批次大小
pub const DEFAULT_BATCH_SIZE: usize = 50;

pub struct BatchCommitter {
    batch_size: usize,
    progress: Arc<AtomicU8>,   // 0-100
    cancel: Arc<AtomicBool>,   // 批间协作取消
}

impl BatchCommitter {
    pub fn new(batch_size: usize) -> Self {
        Self::with_handles(
            batch_size,
            Arc::new(AtomicU8::new(0)),
            Arc::new(AtomicBool::new(false)),
        )
    }

    /// 复用外部进度/取消句柄（会话持有句柄，UI 跨阶段观察）
    pub fn with_handles(
        batch_size: usize,
        progress: Arc<AtomicU8>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            batch_size: batch_size.max(1),
            progress,
            cancel,
        }
    }

    /// 进度观察句柄（UI 在批间读取）
    pub fn progress_handle(&self) -> Arc<AtomicU8> {
        Arc::clone(&self.progress)
    }

    /// 取消句柄（置 true 后在下一个批间停止）
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// 顺序提交全部记录
    ///
    /// # 口径
    /// - 每批一次 insert_batch；失败批的行数全部计入 failed，
    ///   存储的一条错误信息挂在该批首行行号上
    /// - 无论上一批成败都继续下一批（不 abort-on-first-failure）
    /// - 不做任何自动重试
    ///
    /// # 参数
    /// - result: 结果累加器（重复键等已由上游写入）
    pub async fn commit(
        &self,
        store: &dyn RecordStore,
        entity: EntityType,
        records: &[TransformedRecord],
        result: &mut ImportResult,
    ) {
        self.progress.store(0, Ordering::SeqCst);

        let total_chunks = records.len().div_ceil(self.batch_size);
        if total_chunks == 0 {
            self.progress.store(100, Ordering::SeqCst);
            return;
        }

        info!(
            entity = %entity,
            records = records.len(),
            batch_size = self.batch_size,
            chunks = total_chunks,
            "开始批量提交"
        );

        for (chunk_idx, chunk) in records.chunks(self.batch_size).enumerate() {
            // 批间检查协作取消标志
            if self.cancel.load(Ordering::SeqCst) {
                warn!(chunk = chunk_idx, "提交在批间被取消");
                result.cancelled = true;
                return;
            }

            debug!(chunk = chunk_idx + 1, rows = chunk.len(), "提交批次");
            match store.insert_batch(entity, chunk).await {
                Ok(()) => {
                    result.success += chunk.len();
                }
                Err(e) => {
                    // 整批失败: 行数计入 failed，错误只挂批次首行
                    warn!(chunk = chunk_idx + 1, error = %e, "批次被存储拒绝");
                    result.failed += chunk.len();
                    result.errors.push(RowError {
                        row: chunk.first().map(|r| r.row_number).unwrap_or(0),
                        error: e.to_string(),
                    });
                }
            }

            // 进度 = ceil(完成批次 / 总批次 * 100)
            let done = chunk_idx + 1;
            let percent = ((done * 100).div_ceil(total_chunks)).min(100) as u8;
            self.progress.store(percent, Ordering::SeqCst);

            // 批间让出执行权，保证进度/取消在批间可被观察
            tokio::task::yield_now().await;
        }

        info!(
            success = result.success,
            failed = result.failed,
            "批量提交完成"
        );
    }
}
