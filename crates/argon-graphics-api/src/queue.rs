use crate::backends::BackendQueue;
use crate::{
    CommandBuffer, CommandBufferDef, DeviceContext, Fence, GfxResult, PresentSuccessResult,
    QueueType, Semaphore, Swapchain,
};

/// FIFO submission queue. Submission wraps the batch with a leading "wait"
/// buffer that encodes cross-queue semaphore waits before any real work, and
/// attaches a completion handler to the final buffer that signals the fence
/// and outgoing semaphores once the GPU is done.
pub struct Queue {
    device_context: DeviceContext,
    queue_type: QueueType,
    pub(crate) backend_queue: BackendQueue,
}

impl Queue {
    pub fn new(device_context: &DeviceContext, queue_type: QueueType) -> GfxResult<Self> {
        let backend_queue = BackendQueue::new(device_context, queue_type)?;

        Ok(Self {
            device_context: device_context.clone(),
            queue_type,
            backend_queue,
        })
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.device_context
    }

    pub fn queue_type(&self) -> QueueType {
        self.queue_type
    }

    pub fn create_command_buffer(
        &self,
        command_buffer_def: &CommandBufferDef,
    ) -> GfxResult<CommandBuffer> {
        CommandBuffer::new(self, command_buffer_def)
    }

    /// Submits ended command buffers. The CPU does not block; completion is
    /// observable through `signal_fence` and `signal_semaphores`, which fire
    /// on a driver callback thread.
    pub fn submit(
        &mut self,
        command_buffers: &[&CommandBuffer],
        wait_semaphores: &[&Semaphore],
        signal_semaphores: &[&Semaphore],
        signal_fence: Option<&Fence>,
    ) -> GfxResult<()> {
        for command_buffer in command_buffers {
            assert!(
                command_buffer.is_executable(),
                "submitted command buffer was not ended"
            );
        }

        let wait_semaphores: Vec<&Semaphore> = wait_semaphores
            .iter()
            .copied()
            .filter(|semaphore| semaphore.signal_available())
            .collect();
        for semaphore in &wait_semaphores {
            semaphore.set_signal_available(false);
        }
        for semaphore in signal_semaphores {
            semaphore.set_signal_available(true);
        }
        if let Some(fence) = signal_fence {
            fence.set_submitted(true);
        }

        self.backend_submit(
            command_buffers,
            &wait_semaphores,
            signal_semaphores,
            signal_fence,
        )
    }

    /// Presents `image_index` of the swapchain after the wait semaphores
    /// signal. Presentation itself is deferred to a scheduled handler; only
    /// the swapchain's ring bookkeeping advances synchronously.
    pub fn present(
        &mut self,
        swapchain: &Swapchain,
        wait_semaphores: &[&Semaphore],
        image_index: u32,
    ) -> GfxResult<PresentSuccessResult> {
        for semaphore in wait_semaphores {
            if semaphore.signal_available() {
                semaphore.set_signal_available(false);
            }
        }
        self.backend_present(swapchain, wait_semaphores, image_index)
    }

    /// Blocks the calling thread until all submitted work completes.
    pub fn wait_for_queue_idle(&mut self) -> GfxResult<()> {
        self.backend_wait_for_queue_idle()
    }
}
