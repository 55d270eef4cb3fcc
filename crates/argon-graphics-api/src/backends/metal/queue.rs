use std::sync::atomic::Ordering;

use metal::{MTLOrigin, MTLSize};

use crate::{
    CommandBuffer, DeviceContext, Fence, GfxError, GfxResult, PresentSuccessResult, Queue,
    QueueType, Semaphore, Swapchain,
};

/// One native queue kind serves graphics, compute and transfer work; the
/// requested type only affects frontend bookkeeping.
pub(crate) struct MetalQueue {
    pub(crate) queue: metal::CommandQueue,
}

impl MetalQueue {
    pub(crate) fn new(device_context: &DeviceContext, _queue_type: QueueType) -> GfxResult<Self> {
        let device = device_context.inner.backend_device_context.device();
        Ok(Self {
            queue: device.new_command_queue(),
        })
    }
}

impl Queue {
    /// Waits are encoded into a leading command buffer, signals and the
    /// completion handler ride the last one, so the whole submission observes
    /// semaphores exactly once.
    pub(crate) fn backend_submit(
        &mut self,
        command_buffers: &[&CommandBuffer],
        wait_semaphores: &[&Semaphore],
        signal_semaphores: &[&Semaphore],
        signal_fence: Option<&Fence>,
    ) -> GfxResult<()> {
        if !wait_semaphores.is_empty() {
            let wait_buffer = self.backend_queue.queue.new_command_buffer();
            for semaphore in wait_semaphores {
                let backend = &semaphore.inner.backend_semaphore;
                wait_buffer
                    .encode_wait_for_event(&backend.event, backend.target.load(Ordering::Acquire));
            }
            wait_buffer.commit();
        }

        let mut natives = Vec::with_capacity(command_buffers.len());
        for command_buffer in command_buffers {
            let native = command_buffer
                .backend_command_buffer
                .command_buffer
                .as_ref()
                .ok_or_else(|| GfxError::from("submitted command buffer was never recorded"))?;
            natives.push(native);
        }

        let mut signals = Vec::with_capacity(signal_semaphores.len());
        for semaphore in signal_semaphores {
            let value = semaphore.next_value();
            semaphore
                .inner
                .backend_semaphore
                .target
                .store(value, Ordering::Release);
            signals.push(((*semaphore).clone(), value));
        }
        let fence = signal_fence.cloned();

        let standalone;
        let tail: &metal::CommandBufferRef = match natives.last() {
            Some(last) => last,
            None => {
                standalone = self.backend_queue.queue.new_command_buffer().to_owned();
                &standalone
            }
        };

        for (semaphore, value) in &signals {
            tail.encode_signal_event(&semaphore.inner.backend_semaphore.event, *value);
        }

        if !signals.is_empty() || fence.is_some() {
            let completed_signals = signals.clone();
            let block = block::ConcreteBlock::new(move |_: &metal::CommandBufferRef| {
                for (semaphore, value) in &completed_signals {
                    semaphore.signal_from_callback(*value);
                }
                if let Some(fence) = &fence {
                    fence.signal_from_callback();
                }
            })
            .copy();
            tail.add_completed_handler(&block);
        }

        for native in &natives {
            native.commit();
        }
        if natives.is_empty() {
            tail.commit();
        }
        Ok(())
    }

    /// Copies the presented ring image into the next layer drawable. A `None`
    /// drawable means the surface changed shape; report suboptimal so the
    /// caller rebuilds.
    pub(crate) fn backend_present(
        &mut self,
        swapchain: &Swapchain,
        wait_semaphores: &[&Semaphore],
        image_index: u32,
    ) -> GfxResult<PresentSuccessResult> {
        let drawable = match swapchain.backend_swapchain.layer.next_drawable() {
            Some(drawable) => drawable.to_owned(),
            None => return Ok(PresentSuccessResult::SuccessSuboptimal),
        };

        let command_buffer = self.backend_queue.queue.new_command_buffer();
        for semaphore in wait_semaphores {
            let backend = &semaphore.inner.backend_semaphore;
            command_buffer
                .encode_wait_for_event(&backend.event, backend.target.load(Ordering::Acquire));
        }

        let image = &swapchain.backend_swapchain.images[image_index as usize];
        let extents = image.texture.definition().extents;
        let encoder = command_buffer.new_blit_command_encoder();
        encoder.copy_from_texture(
            &image.texture.inner.backend_texture.texture,
            0,
            0,
            MTLOrigin { x: 0, y: 0, z: 0 },
            MTLSize {
                width: u64::from(extents.width),
                height: u64::from(extents.height),
                depth: 1,
            },
            drawable.texture(),
            0,
            0,
            MTLOrigin { x: 0, y: 0, z: 0 },
        );
        encoder.end_encoding();

        command_buffer.present_drawable(&drawable);
        command_buffer.commit();
        Ok(PresentSuccessResult::Success)
    }

    pub(crate) fn backend_wait_for_queue_idle(&mut self) -> GfxResult<()> {
        let command_buffer = self.backend_queue.queue.new_command_buffer();
        command_buffer.commit();
        command_buffer.wait_until_completed();
        Ok(())
    }
}
