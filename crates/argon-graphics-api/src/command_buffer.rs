use crate::backends::BackendCommandBuffer;
use crate::{
    Buffer, BufferBarrier, BufferCopy, ClearPipelineKey, CmdCopyBufferToTextureParams,
    CmdCopyTextureParams, CmdResolveTextureRegionParams, ColorClearValue, ColorFlags,
    DepthStencilClearValue, DescriptorSet, DeviceContext, Format, GfxError, GfxResult,
    IndexType, LoadOp, PipelineType, PushConstantDef, QueueType, SampleCount, ScissorRect,
    StoreOp, Texture, TextureBarrier, TextureView, Viewport, MAX_DESCRIPTOR_SET_LAYOUTS,
    MAX_VERTEX_INPUT_BINDINGS, PUSH_CONSTANT_SLOT_BASE,
};

/// Used to create a `CommandBuffer`
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandBufferDef {
    /// Secondary command buffers are used to encode a single pass on multiple
    /// threads
    pub is_secondary: bool,
}

/// A color render target bound during a renderpass
#[derive(Debug)]
pub struct ColorRenderTargetBinding<'a> {
    pub texture_view: &'a TextureView,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ColorClearValue,
}

/// A depth/stencil render target bound during a renderpass
#[derive(Debug)]
pub struct DepthStencilRenderTargetBinding<'a> {
    pub texture_view: &'a TextureView,
    pub depth_load_op: LoadOp,
    pub stencil_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub stencil_store_op: StoreOp,
    pub clear_value: DepthStencilClearValue,
}

/// A vertex buffer bound during a renderpass
pub struct VertexBufferBinding<'a> {
    pub buffer: &'a Buffer,
    pub byte_offset: u64,
}

/// An index buffer bound during a renderpass
pub struct IndexBufferBinding<'a> {
    pub buffer: &'a Buffer,
    pub byte_offset: u64,
    pub index_type: IndexType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecordingState {
    /// Freshly created, or committed and awaiting the next `begin`
    Initial,
    Recording,
    /// `end` was called; ready for submission
    Executable,
}

/// Hardware command-recording context kinds. The platform forbids
/// interleaving different kinds on one command buffer, so only one may be
/// open at any instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EncoderKind {
    None,
    Render,
    Compute,
    Blit,
    Resolve,
}

bitflags::bitflags! {
    pub(crate) struct GraphicsDirtyFlags: u8 {
        const PIPELINE = 0x01;
        const DESCRIPTOR_SETS = 0x02;
        const PUSH_CONSTANTS = 0x04;
        const VIEWPORTS = 0x08;
        const SCISSORS = 0x10;
        const VERTEX_BUFFERS = 0x20;
    }
}

bitflags::bitflags! {
    pub(crate) struct ComputeDirtyFlags: u8 {
        const PIPELINE = 0x01;
        const DESCRIPTOR_SETS = 0x02;
        const PUSH_CONSTANTS = 0x04;
    }
}

/// Owned snapshot of one `cmd_bind_render_targets` call; the pass is not
/// opened until a draw or clear actually needs it.
#[derive(Clone)]
pub(crate) struct ColorTargetState {
    pub(crate) texture_view: TextureView,
    pub(crate) load_op: LoadOp,
    pub(crate) store_op: StoreOp,
    pub(crate) clear_value: ColorClearValue,
}

#[derive(Clone)]
pub(crate) struct DepthStencilTargetState {
    pub(crate) texture_view: TextureView,
    pub(crate) depth_load_op: LoadOp,
    pub(crate) stencil_load_op: LoadOp,
    pub(crate) depth_store_op: StoreOp,
    pub(crate) stencil_store_op: StoreOp,
    pub(crate) clear_value: DepthStencilClearValue,
}

#[derive(Clone)]
pub(crate) struct RenderPassSetup {
    pub(crate) color_targets: Vec<ColorTargetState>,
    pub(crate) depth_stencil_target: Option<DepthStencilTargetState>,
}

impl RenderPassSetup {
    fn sample_count(&self) -> SampleCount {
        self.color_targets
            .first()
            .map(|target| target.texture_view.sample_count())
            .or_else(|| {
                self.depth_stencil_target
                    .as_ref()
                    .map(|target| target.texture_view.sample_count())
            })
            .unwrap_or_default()
    }

    fn color_formats(&self) -> Vec<Format> {
        self.color_targets
            .iter()
            .map(|target| target.texture_view.format())
            .collect()
    }

    fn depth_stencil_format(&self) -> Option<Format> {
        self.depth_stencil_target
            .as_ref()
            .map(|target| target.texture_view.format())
    }

    /// A requested clear load action can only take effect at pass start, so
    /// it always forces a fresh encoder.
    fn wants_clear(&self) -> bool {
        self.color_targets
            .iter()
            .any(|target| target.load_op == LoadOp::Clear)
            || self.depth_stencil_target.as_ref().map_or(false, |target| {
                target.depth_load_op == LoadOp::Clear || target.stencil_load_op == LoadOp::Clear
            })
    }

    /// Once a pass consumed the requested clears, rebinding the same targets
    /// must not clear again.
    fn consume_clears(&mut self) {
        for target in &mut self.color_targets {
            if target.load_op == LoadOp::Clear {
                target.load_op = LoadOp::Load;
            }
        }
        if let Some(target) = &mut self.depth_stencil_target {
            if target.depth_load_op == LoadOp::Clear {
                target.depth_load_op = LoadOp::Load;
            }
            if target.stencil_load_op == LoadOp::Clear {
                target.stencil_load_op = LoadOp::Load;
            }
        }
    }

    fn identity(&self) -> AttachmentIdentity {
        AttachmentIdentity {
            color_uids: self
                .color_targets
                .iter()
                .map(|target| target.texture_view.uid())
                .collect(),
            depth_uid: self
                .depth_stencil_target
                .as_ref()
                .map(|target| target.texture_view.uid()),
            sample_count: self.sample_count(),
        }
    }
}

/// Attachment identity of the currently-open render encoder. A pending
/// binding with the same identity can keep reusing the open pass.
#[derive(Clone, PartialEq, Eq)]
struct AttachmentIdentity {
    color_uids: Vec<u64>,
    depth_uid: Option<u64>,
    sample_count: SampleCount,
}

#[derive(Clone)]
struct BoundDescriptorSet {
    set: DescriptorSet,
    /// Set version at bind time; a later mutation of the set raises the
    /// dirty bit again through comparison on the next bind call.
    version: u64,
}

#[derive(Clone)]
struct BoundVertexBuffer {
    buffer: Buffer,
    byte_offset: u64,
}

#[derive(Clone)]
pub(crate) struct BoundIndexBuffer {
    pub(crate) buffer: Buffer,
    pub(crate) byte_offset: u64,
    pub(crate) index_type: IndexType,
}

/// Byte scratch for one push-constant range, re-uploaded on replay.
#[derive(Clone)]
struct PushConstantState {
    def: PushConstantDef,
    data: Vec<u8>,
}

#[derive(Default)]
struct GraphicsState {
    pipeline: Option<crate::Pipeline>,
    viewports: Vec<Viewport>,
    scissors: Vec<ScissorRect>,
    vertex_buffers: Vec<Option<BoundVertexBuffer>>,
    index_buffer: Option<BoundIndexBuffer>,
}

#[derive(Default)]
struct ComputeState {
    pipeline: Option<crate::Pipeline>,
}

/// The command-recording state machine.
///
/// Recording is single-threaded by design; no internal locking guards the
/// dirty-state caches. State-setting calls only record intent and raise
/// dirty bits; the state is materialized into the active hardware encoder
/// lazily, right before a draw or dispatch. Opening an encoder invalidates
/// everything previously applied to the prior one, so encoder transitions
/// mark all corresponding state dirty.
pub struct CommandBuffer {
    device_context: DeviceContext,
    queue_type: QueueType,
    state: RecordingState,

    encoder: EncoderKind,
    /// Targets the caller last bound; applied when a render pass opens.
    pending_targets: Option<RenderPassSetup>,
    /// Attachment identity of the open render encoder, if any.
    encoder_targets: Option<AttachmentIdentity>,

    graphics: GraphicsState,
    graphics_dirty: GraphicsDirtyFlags,
    compute: ComputeState,
    compute_dirty: ComputeDirtyFlags,

    /// Descriptor sets are a single binding space shared by both pipeline
    /// kinds; each kind tracks its own dirty bit over it.
    bound_sets: Vec<Option<BoundDescriptorSet>>,
    push_constants: Vec<PushConstantState>,

    /// Number of render passes opened over this command buffer's lifetime.
    /// Diagnostic; a steadily climbing count for a static scene usually
    /// means something is thrashing the encoder.
    render_pass_count: u64,
    /// Number of descriptor-set snapshots replayed into argument buffers.
    descriptor_replay_count: u64,

    pub(crate) backend_command_buffer: BackendCommandBuffer,
}

impl CommandBuffer {
    pub(crate) fn new(queue: &crate::Queue, command_buffer_def: &CommandBufferDef) -> GfxResult<Self> {
        let backend_command_buffer = BackendCommandBuffer::new(queue, command_buffer_def)?;

        Ok(Self {
            device_context: queue.device_context().clone(),
            queue_type: queue.queue_type(),
            state: RecordingState::Initial,
            encoder: EncoderKind::None,
            pending_targets: None,
            encoder_targets: None,
            graphics: GraphicsState {
                vertex_buffers: vec![None; MAX_VERTEX_INPUT_BINDINGS],
                ..GraphicsState::default()
            },
            graphics_dirty: GraphicsDirtyFlags::empty(),
            compute: ComputeState::default(),
            compute_dirty: ComputeDirtyFlags::empty(),
            bound_sets: vec![None; MAX_DESCRIPTOR_SET_LAYOUTS],
            push_constants: Vec::new(),
            render_pass_count: 0,
            descriptor_replay_count: 0,
            backend_command_buffer,
        })
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.device_context
    }

    pub fn queue_type(&self) -> QueueType {
        self.queue_type
    }

    /// Render passes opened so far; see the field note.
    pub fn render_pass_count(&self) -> u64 {
        self.render_pass_count
    }

    /// Descriptor-set snapshots written so far.
    pub fn descriptor_replay_count(&self) -> u64 {
        self.descriptor_replay_count
    }

    pub(crate) fn is_executable(&self) -> bool {
        self.state == RecordingState::Executable
    }

    pub fn begin(&mut self) -> GfxResult<()> {
        assert_ne!(
            self.state,
            RecordingState::Recording,
            "begin on a command buffer that is already recording"
        );
        self.reset_recording_state();
        self.backend_begin()?;
        self.state = RecordingState::Recording;
        Ok(())
    }

    /// Flushes any still-open encoder and closes recording. The buffer may
    /// then be submitted once; it must be `begin`-ed again before reuse.
    pub fn end(&mut self) -> GfxResult<()> {
        self.assert_recording();
        self.close_encoder();
        self.backend_end()?;
        self.state = RecordingState::Executable;
        Ok(())
    }

    //
    // Render targets
    //

    /// Records the framebuffer for subsequent draws. Lazy: the pass opens at
    /// the next draw or clear. Rebinding the identical attachment set while
    /// its pass is still open does not end the encoder; binding different
    /// attachments (including a sample-count change) or requesting a clear
    /// load action does.
    pub fn cmd_bind_render_targets(
        &mut self,
        color_targets: &[ColorRenderTargetBinding<'_>],
        depth_stencil_target: Option<&DepthStencilRenderTargetBinding<'_>>,
    ) {
        self.assert_recording();

        if color_targets.is_empty() && depth_stencil_target.is_none() {
            self.pending_targets = None;
            return;
        }

        for target in color_targets {
            assert!(
                target
                    .texture_view
                    .texture()
                    .definition()
                    .usage_flags
                    .intersects(crate::ResourceUsage::AS_RENDER_TARGET),
                "color target is not a render target"
            );
        }
        if let Some(target) = depth_stencil_target {
            assert!(target.texture_view.format().is_depth());
        }

        self.pending_targets = Some(RenderPassSetup {
            color_targets: color_targets
                .iter()
                .map(|target| ColorTargetState {
                    texture_view: target.texture_view.clone(),
                    load_op: target.load_op,
                    store_op: target.store_op,
                    clear_value: target.clear_value,
                })
                .collect(),
            depth_stencil_target: depth_stencil_target.map(|target| DepthStencilTargetState {
                texture_view: target.texture_view.clone(),
                depth_load_op: target.depth_load_op,
                stencil_load_op: target.stencil_load_op,
                depth_store_op: target.depth_store_op,
                stencil_store_op: target.stencil_store_op,
                clear_value: target.clear_value,
            }),
        });
    }

    //
    // State setters: record intent, raise dirty bits on actual change
    //

    pub fn cmd_bind_pipeline(&mut self, pipeline: &crate::Pipeline) {
        self.assert_recording();
        match pipeline.pipeline_type() {
            PipelineType::Graphics => {
                if let Some(current) = &self.graphics.pipeline {
                    if current.uid() == pipeline.uid() {
                        return;
                    }
                    // A pipeline-layout switch invalidates the encoder's
                    // argument-table bindings wholesale.
                    if current.pipeline_layout() != pipeline.pipeline_layout() {
                        self.close_encoder();
                    }
                }
                self.graphics.pipeline = Some(pipeline.clone());
                self.graphics_dirty |=
                    GraphicsDirtyFlags::PIPELINE | GraphicsDirtyFlags::DESCRIPTOR_SETS;
            }
            PipelineType::Compute => {
                if let Some(current) = &self.compute.pipeline {
                    if current.uid() == pipeline.uid() {
                        return;
                    }
                    if current.pipeline_layout() != pipeline.pipeline_layout() {
                        self.compute_dirty |=
                            ComputeDirtyFlags::DESCRIPTOR_SETS | ComputeDirtyFlags::PUSH_CONSTANTS;
                    }
                }
                self.compute.pipeline = Some(pipeline.clone());
                self.compute_dirty |= ComputeDirtyFlags::PIPELINE;
            }
        }
    }

    /// Binds `descriptor_set` at its layout's declared set index. Binding
    /// the same, unmutated set again is a no-op; mutating a set between
    /// binds (version change) raises the dirty bit.
    pub fn cmd_bind_descriptor_set(&mut self, descriptor_set: &DescriptorSet) {
        self.assert_recording();
        let slot = descriptor_set.layout().frequency() as usize;
        assert!(slot < MAX_DESCRIPTOR_SET_LAYOUTS);

        let version = descriptor_set.version();
        if let Some(bound) = &self.bound_sets[slot] {
            if bound.set.uid() == descriptor_set.uid() && bound.version == version {
                return;
            }
        }
        self.bound_sets[slot] = Some(BoundDescriptorSet {
            set: descriptor_set.clone(),
            version,
        });
        self.graphics_dirty |= GraphicsDirtyFlags::DESCRIPTOR_SETS;
        self.compute_dirty |= ComputeDirtyFlags::DESCRIPTOR_SETS;
    }

    pub fn cmd_set_viewports(&mut self, viewports: &[Viewport]) {
        self.assert_recording();
        if self.graphics.viewports == viewports {
            return;
        }
        self.graphics.viewports = viewports.to_vec();
        self.graphics_dirty |= GraphicsDirtyFlags::VIEWPORTS;
    }

    pub fn cmd_set_scissors(&mut self, scissors: &[ScissorRect]) {
        self.assert_recording();
        if self.graphics.scissors == scissors {
            return;
        }
        self.graphics.scissors = scissors.to_vec();
        self.graphics_dirty |= GraphicsDirtyFlags::SCISSORS;
    }

    pub fn cmd_bind_vertex_buffers(
        &mut self,
        first_binding: u32,
        bindings: &[VertexBufferBinding<'_>],
    ) {
        self.assert_recording();
        assert!(first_binding as usize + bindings.len() <= MAX_VERTEX_INPUT_BINDINGS);

        let mut changed = false;
        for (i, binding) in bindings.iter().enumerate() {
            let slot = first_binding as usize + i;
            let same = self.graphics.vertex_buffers[slot]
                .as_ref()
                .map_or(false, |bound| {
                    bound.buffer.uid() == binding.buffer.uid()
                        && bound.byte_offset == binding.byte_offset
                });
            if !same {
                self.graphics.vertex_buffers[slot] = Some(BoundVertexBuffer {
                    buffer: binding.buffer.clone(),
                    byte_offset: binding.byte_offset,
                });
                changed = true;
            }
        }
        if changed {
            self.graphics_dirty |= GraphicsDirtyFlags::VERTEX_BUFFERS;
        }
    }

    /// The index buffer is consumed directly by indexed draws; it does not
    /// participate in the dirty-state system.
    pub fn cmd_bind_index_buffer(&mut self, binding: &IndexBufferBinding<'_>) {
        self.assert_recording();
        self.graphics.index_buffer = Some(BoundIndexBuffer {
            buffer: binding.buffer.clone(),
            byte_offset: binding.byte_offset,
            index_type: binding.index_type,
        });
    }

    /// Copies `data` into the scratch for push-constant range `range_index`
    /// of `pipeline_layout`. Replay uploads the bytes inline at buffer slot
    /// `PUSH_CONSTANT_SLOT_BASE + binding` for every stage the range names.
    pub fn cmd_push_constants(
        &mut self,
        pipeline_layout: &crate::PipelineLayout,
        range_index: usize,
        data: &[u8],
    ) {
        self.assert_recording();
        let def = pipeline_layout.push_constants()[range_index];
        assert_eq!(data.len() as u32, def.size, "push-constant size mismatch");

        let existing = self
            .push_constants
            .iter_mut()
            .find(|state| state.def == def);
        match existing {
            Some(state) => {
                if state.data == data {
                    return;
                }
                state.data.clear();
                state.data.extend_from_slice(data);
            }
            None => self.push_constants.push(PushConstantState {
                def,
                data: data.to_vec(),
            }),
        }

        if def.stage_flags.intersects(crate::ShaderStageFlags::GRAPHICS_STAGE_FLAGS) {
            self.graphics_dirty |= GraphicsDirtyFlags::PUSH_CONSTANTS;
        }
        if def.stage_flags.intersects(crate::ShaderStageFlags::COMPUTE) {
            self.compute_dirty |= ComputeDirtyFlags::PUSH_CONSTANTS;
        }
    }

    //
    // Draws and dispatch
    //

    pub fn cmd_draw(&mut self, vertex_count: u32, first_vertex: u32) -> GfxResult<()> {
        self.prepare_draw()?;
        self.backend_draw(vertex_count, first_vertex)
    }

    pub fn cmd_draw_instanced(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
        first_instance: u32,
    ) -> GfxResult<()> {
        self.prepare_draw()?;
        self.backend_draw_instanced(vertex_count, first_vertex, instance_count, first_instance)
    }

    pub fn cmd_draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> GfxResult<()> {
        self.prepare_draw()?;
        assert!(self.graphics.index_buffer.is_some(), "no index buffer bound");
        self.backend_draw_indexed(index_count, first_index, vertex_offset)
    }

    pub fn cmd_draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        first_instance: u32,
        vertex_offset: i32,
    ) -> GfxResult<()> {
        self.prepare_draw()?;
        assert!(self.graphics.index_buffer.is_some(), "no index buffer bound");
        self.backend_draw_indexed_instanced(
            index_count,
            instance_count,
            first_index,
            first_instance,
            vertex_offset,
        )
    }

    pub fn cmd_dispatch(
        &mut self,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) -> GfxResult<()> {
        self.assert_recording();
        assert!(self.compute.pipeline.is_some(), "no compute pipeline bound");
        self.apply_compute_state()?;
        self.backend_dispatch([group_count_x, group_count_y, group_count_z])
    }

    //
    // Copies: issued immediately on the blit encoder, outside the
    // dirty-state system
    //

    pub fn cmd_copy_buffer_to_buffer(
        &mut self,
        src_buffer: &Buffer,
        dst_buffer: &Buffer,
        copy_data: &[BufferCopy],
    ) -> GfxResult<()> {
        self.assert_recording();
        self.ensure_blit_encoder()?;
        self.backend_copy_buffer_to_buffer(src_buffer, dst_buffer, copy_data)
    }

    pub fn cmd_copy_buffer_to_texture(
        &mut self,
        src_buffer: &Buffer,
        dst_texture: &Texture,
        params: &CmdCopyBufferToTextureParams,
    ) -> GfxResult<()> {
        self.assert_recording();
        self.ensure_blit_encoder()?;
        self.backend_copy_buffer_to_texture(src_buffer, dst_texture, params)
    }

    pub fn cmd_copy_texture(
        &mut self,
        src_texture: &Texture,
        dst_texture: &Texture,
        params: &CmdCopyTextureParams,
    ) -> GfxResult<()> {
        self.assert_recording();
        self.ensure_blit_encoder()?;
        self.backend_copy_texture(src_texture, dst_texture, params)
    }

    //
    // Clears: cached full-screen draws inside the current pass
    //

    /// Clears every bound color target to `clear_value` by drawing a
    /// full-screen triangle with a pipeline cached per attachment-format
    /// set. Transparent to recorded state: the dirty bits are identical
    /// before and after.
    pub fn cmd_clear_color(&mut self, clear_value: ColorClearValue) -> GfxResult<()> {
        self.assert_recording();
        let key = {
            let pending = self
                .pending_targets
                .as_ref()
                .expect("no render targets bound");
            assert!(!pending.color_targets.is_empty(), "no color targets bound");
            ClearPipelineKey::for_color(
                pending.color_formats(),
                pending.depth_stencil_format(),
                pending.sample_count(),
                ColorFlags::ALL,
            )
        };
        self.clear_draw(&key, clear_value.0, 1.0)
    }

    /// Clears the bound depth/stencil target; same mechanism as
    /// `cmd_clear_color`.
    pub fn cmd_clear_depth_stencil(
        &mut self,
        clear_value: DepthStencilClearValue,
    ) -> GfxResult<()> {
        self.assert_recording();
        let key = {
            let pending = self
                .pending_targets
                .as_ref()
                .expect("no render targets bound");
            let format = pending
                .depth_stencil_format()
                .expect("no depth/stencil target bound");
            ClearPipelineKey::for_depth(pending.color_formats(), format, pending.sample_count())
        };
        self.clear_draw(&key, [0.0; 4], clear_value.depth)
    }

    fn clear_draw(
        &mut self,
        key: &ClearPipelineKey,
        color: [f32; 4],
        depth: f32,
    ) -> GfxResult<()> {
        let clear_pipeline = self.device_context.clear_pipeline(key)?;
        self.ensure_render_encoder()?;

        let saved_dirty = self.graphics_dirty;
        self.backend_clear_draw(&clear_pipeline, color, depth)?;

        // The clear draw clobbered the encoder's pipeline and inline
        // constants. Re-apply exactly the pieces the caller had already
        // applied (clear bits), then hand back the dirty set untouched.
        self.graphics_dirty = (GraphicsDirtyFlags::PIPELINE | GraphicsDirtyFlags::PUSH_CONSTANTS)
            & !saved_dirty;
        self.apply_graphics_dirty()?;
        self.graphics_dirty = saved_dirty;
        Ok(())
    }

    //
    // Resolves
    //

    /// Full-surface multisample resolve via a render-pass resolve action.
    pub fn cmd_resolve_texture(
        &mut self,
        src_texture: &Texture,
        dst_texture: &Texture,
    ) -> GfxResult<()> {
        self.assert_recording();
        assert_ne!(
            src_texture.definition().sample_count,
            SampleCount::SampleCount1,
            "resolve source must be multisampled"
        );
        assert_eq!(
            dst_texture.definition().sample_count,
            SampleCount::SampleCount1
        );
        assert_eq!(src_texture.format(), dst_texture.format());
        assert_eq!(src_texture.extents(), dst_texture.extents());

        self.close_encoder();
        self.encoder = EncoderKind::Resolve;
        let result = self.backend_resolve_texture(src_texture, dst_texture);
        self.encoder = EncoderKind::None;
        result
    }

    /// Region-limited resolve. No hardware primitive covers this, so it runs
    /// as a compute pass averaging samples over a fixed thread-group grid.
    pub fn cmd_resolve_texture_region(
        &mut self,
        src_texture: &Texture,
        dst_texture: &Texture,
        params: &CmdResolveTextureRegionParams,
    ) -> GfxResult<()> {
        self.assert_recording();
        assert_ne!(
            src_texture.definition().sample_count,
            SampleCount::SampleCount1
        );
        assert_eq!(src_texture.format(), dst_texture.format());
        let extents = src_texture.extents();
        assert!(params.src_offset.x + params.extent.width <= extents.width);
        assert!(params.src_offset.y + params.extent.height <= extents.height);

        self.close_encoder();
        self.encoder = EncoderKind::Resolve;
        let result = self.backend_resolve_texture_region(src_texture, dst_texture, params);
        self.encoder = EncoderKind::None;
        result
    }

    //
    // Barriers and unsupported paths
    //

    /// Accepted for interface compatibility; the platform's automatic hazard
    /// tracking covers these dependencies, so no commands are recorded.
    pub fn cmd_resource_barrier(
        &mut self,
        _buffer_barriers: &[BufferBarrier<'_>],
        _texture_barriers: &[TextureBarrier<'_>],
    ) {
        self.assert_recording();
    }

    pub fn cmd_build_acceleration_structure(&mut self) -> GfxResult<()> {
        Err(GfxError::Unsupported("acceleration structure builds"))
    }

    pub fn cmd_dispatch_rays(&mut self) -> GfxResult<()> {
        Err(GfxError::Unsupported("ray dispatch"))
    }

    //
    // Encoder lifecycle
    //

    fn assert_recording(&self) {
        assert_eq!(
            self.state,
            RecordingState::Recording,
            "command buffer is not recording"
        );
    }

    fn reset_recording_state(&mut self) {
        self.encoder = EncoderKind::None;
        self.pending_targets = None;
        self.encoder_targets = None;
        self.graphics = GraphicsState {
            vertex_buffers: vec![None; MAX_VERTEX_INPUT_BINDINGS],
            ..GraphicsState::default()
        };
        self.graphics_dirty = GraphicsDirtyFlags::empty();
        self.compute = ComputeState::default();
        self.compute_dirty = ComputeDirtyFlags::empty();
        for slot in &mut self.bound_sets {
            *slot = None;
        }
        self.push_constants.clear();
    }

    fn close_encoder(&mut self) {
        match self.encoder {
            EncoderKind::None | EncoderKind::Resolve => {}
            EncoderKind::Render => {
                self.backend_end_render_pass();
                self.encoder_targets = None;
                // the next render encoder starts with nothing applied
                self.graphics_dirty = GraphicsDirtyFlags::all();
            }
            EncoderKind::Compute => {
                self.backend_end_compute_pass();
                self.compute_dirty = ComputeDirtyFlags::all();
            }
            EncoderKind::Blit => {
                self.backend_end_blit_pass();
            }
        }
        self.encoder = EncoderKind::None;
    }

    fn ensure_render_encoder(&mut self) -> GfxResult<()> {
        let pending = self
            .pending_targets
            .as_ref()
            .expect("no render targets bound");
        let wants_clear = pending.wants_clear();
        let pending_identity = pending.identity();

        if self.encoder == EncoderKind::Render
            && !wants_clear
            && self.encoder_targets.as_ref() == Some(&pending_identity)
        {
            return Ok(());
        }

        self.close_encoder();
        let setup = self.pending_targets.clone().unwrap();
        self.backend_begin_render_pass(&setup)?;
        self.encoder = EncoderKind::Render;
        self.encoder_targets = Some(pending_identity);
        self.render_pass_count += 1;
        self.graphics_dirty = GraphicsDirtyFlags::all();
        if let Some(pending) = &mut self.pending_targets {
            pending.consume_clears();
        }
        Ok(())
    }

    fn ensure_blit_encoder(&mut self) -> GfxResult<()> {
        if self.encoder != EncoderKind::Blit {
            self.close_encoder();
            self.backend_begin_blit_pass()?;
            self.encoder = EncoderKind::Blit;
        }
        Ok(())
    }

    fn prepare_draw(&mut self) -> GfxResult<()> {
        self.assert_recording();
        assert!(
            self.graphics.pipeline.is_some(),
            "no graphics pipeline bound"
        );
        self.ensure_render_encoder()?;
        self.apply_graphics_dirty()
    }

    /// Materializes dirty graphics state into the open render encoder.
    fn apply_graphics_dirty(&mut self) -> GfxResult<()> {
        debug_assert_eq!(self.encoder, EncoderKind::Render);
        let dirty = self.graphics_dirty;
        if dirty.is_empty() {
            return Ok(());
        }

        if dirty.intersects(GraphicsDirtyFlags::PIPELINE) {
            if let Some(pipeline) = self.graphics.pipeline.clone() {
                self.backend_bind_pipeline(&pipeline);
            }
        }
        if dirty.intersects(GraphicsDirtyFlags::VIEWPORTS) && !self.graphics.viewports.is_empty() {
            let viewports = self.graphics.viewports.clone();
            self.backend_set_viewports(&viewports);
        }
        if dirty.intersects(GraphicsDirtyFlags::SCISSORS) && !self.graphics.scissors.is_empty() {
            let scissors = self.graphics.scissors.clone();
            self.backend_set_scissors(&scissors);
        }
        if dirty.intersects(GraphicsDirtyFlags::VERTEX_BUFFERS) {
            for slot in 0..MAX_VERTEX_INPUT_BINDINGS {
                if let Some(bound) = self.graphics.vertex_buffers[slot].clone() {
                    self.backend_bind_vertex_buffer(slot as u32, &bound.buffer, bound.byte_offset);
                }
            }
        }
        if dirty.intersects(GraphicsDirtyFlags::DESCRIPTOR_SETS) {
            self.replay_descriptor_sets(PipelineType::Graphics)?;
        }
        if dirty.intersects(GraphicsDirtyFlags::PUSH_CONSTANTS) {
            self.replay_push_constants(PipelineType::Graphics);
        }

        self.graphics_dirty = GraphicsDirtyFlags::empty();
        Ok(())
    }

    fn apply_compute_state(&mut self) -> GfxResult<()> {
        if self.encoder != EncoderKind::Compute {
            self.close_encoder();
            self.backend_begin_compute_pass()?;
            self.encoder = EncoderKind::Compute;
            self.compute_dirty = ComputeDirtyFlags::all();
        }

        let dirty = self.compute_dirty;
        if dirty.intersects(ComputeDirtyFlags::PIPELINE) {
            if let Some(pipeline) = self.compute.pipeline.clone() {
                self.backend_bind_pipeline(&pipeline);
            }
        }
        if dirty.intersects(ComputeDirtyFlags::DESCRIPTOR_SETS) {
            self.replay_descriptor_sets(PipelineType::Compute)?;
        }
        if dirty.intersects(ComputeDirtyFlags::PUSH_CONSTANTS) {
            self.replay_push_constants(PipelineType::Compute);
        }
        self.compute_dirty = ComputeDirtyFlags::empty();
        Ok(())
    }

    /// Snapshots every set the active pipeline layout declares into a fresh
    /// ring-claimed argument-buffer region and binds the region on the
    /// encoder.
    fn replay_descriptor_sets(&mut self, pipeline_type: PipelineType) -> GfxResult<()> {
        let pipeline = match pipeline_type {
            PipelineType::Graphics => self.graphics.pipeline.clone(),
            PipelineType::Compute => self.compute.pipeline.clone(),
        };
        let pipeline = match pipeline {
            Some(pipeline) => pipeline,
            None => return Ok(()),
        };
        let layout = pipeline.pipeline_layout().clone();

        for (slot, set_layout) in layout.descriptor_set_layouts().iter().enumerate() {
            let bound = self.bound_sets[slot]
                .as_ref()
                .unwrap_or_else(|| panic!("no descriptor set bound at slot {}", slot));
            assert!(
                bound.set.layout() == set_layout,
                "descriptor set at slot {} does not match the pipeline layout",
                slot
            );
            let set = bound.set.clone();
            let ring_offset = set_layout.claim_ring_region();

            // The argument buffer is bound at the set's numeric slot on both
            // the fragment and vertex stages. Vertex-stage binding must be
            // skipped when an explicit vertex buffer already occupies that
            // slot, since both binding spaces share one index range.
            let skip_vertex_stage = pipeline_type == PipelineType::Graphics
                && slot < MAX_VERTEX_INPUT_BINDINGS
                && self.graphics.vertex_buffers[slot].is_some();

            let set_layout = set_layout.clone();
            self.backend_bind_descriptor_set(
                &set_layout,
                &set,
                ring_offset,
                pipeline_type,
                skip_vertex_stage,
            )?;
            self.descriptor_replay_count += 1;
        }
        Ok(())
    }

    fn replay_push_constants(&mut self, pipeline_type: PipelineType) {
        let stage_mask = match pipeline_type {
            PipelineType::Graphics => crate::ShaderStageFlags::GRAPHICS_STAGE_FLAGS,
            PipelineType::Compute => crate::ShaderStageFlags::COMPUTE,
        };
        let ranges: Vec<PushConstantState> = self
            .push_constants
            .iter()
            .filter(|state| state.def.stage_flags.intersects(stage_mask))
            .cloned()
            .collect();
        for state in &ranges {
            let slot = PUSH_CONSTANT_SLOT_BASE + state.def.binding;
            self.backend_push_constants(slot, state.def.stage_flags, &state.data);
        }
    }

    pub(crate) fn bound_index_buffer(&self) -> Option<&BoundIndexBuffer> {
        self.graphics.index_buffer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ApiDef, BlendState, BufferDef, DepthState, DescriptorRangeDef, DescriptorSetLayoutDef,
        DeviceContext, Extents3D, GfxApi, GraphicsPipelineDef, MemoryUsage, PipelineLayoutDef,
        PrimitiveTopology, PushConstantDef, RasterizerState, ResourceUsage, ShaderModuleDef,
        ShaderResourceType, ShaderStageDef, ShaderStageFlags, TextureDef, TextureViewDef,
        VertexLayout,
    };

    fn test_api() -> GfxApi {
        #[allow(unsafe_code)]
        unsafe {
            GfxApi::new(&ApiDef::default()).unwrap()
        }
    }

    fn render_target(device_context: &DeviceContext, sample_count: SampleCount) -> TextureView {
        let texture = device_context
            .create_texture(&TextureDef {
                extents: Extents3D {
                    width: 64,
                    height: 64,
                    depth: 1,
                },
                format: Format::R8G8B8A8_UNORM,
                usage_flags: ResourceUsage::AS_RENDER_TARGET,
                sample_count,
                ..TextureDef::default()
            })
            .unwrap();
        texture
            .create_view(&TextureViewDef::as_render_target_view(&texture))
            .unwrap()
    }

    fn color_binding(view: &TextureView) -> ColorRenderTargetBinding<'_> {
        ColorRenderTargetBinding {
            texture_view: view,
            load_op: LoadOp::Load,
            store_op: StoreOp::Store,
            clear_value: ColorClearValue::default(),
        }
    }

    struct Fixture {
        layout: crate::DescriptorSetLayout,
        pipeline_layout: crate::PipelineLayout,
        pipeline: crate::Pipeline,
    }

    fn graphics_fixture(device_context: &DeviceContext) -> Fixture {
        let layout = device_context
            .create_descriptor_set_layout(&DescriptorSetLayoutDef {
                frequency: 0,
                ranges: vec![DescriptorRangeDef::new(
                    "frame_cb",
                    0,
                    ShaderResourceType::ConstantBuffer,
                    1,
                )],
            })
            .unwrap();
        let pipeline_layout = device_context
            .create_pipeline_layout(PipelineLayoutDef {
                descriptor_set_layouts: vec![layout.clone()],
                push_constants: vec![PushConstantDef {
                    offset: 0,
                    size: 16,
                    binding: 0,
                    stage_flags: ShaderStageFlags::GRAPHICS_STAGE_FLAGS,
                }],
            })
            .unwrap();

        let module = device_context
            .create_shader_module(ShaderModuleDef {
                library_bytes: &[0u8; 4],
            })
            .unwrap();
        let shader = device_context
            .create_shader(vec![
                ShaderStageDef {
                    shader_module: module.clone(),
                    entry_point: "vs_main".to_string(),
                    shader_stage: ShaderStageFlags::VERTEX,
                    specializations: Vec::new(),
                },
                ShaderStageDef {
                    shader_module: module,
                    entry_point: "fs_main".to_string(),
                    shader_stage: ShaderStageFlags::FRAGMENT,
                    specializations: Vec::new(),
                },
            ])
            .unwrap();

        let pipeline = device_context
            .create_graphics_pipeline(&GraphicsPipelineDef {
                shader: &shader,
                pipeline_layout: &pipeline_layout,
                vertex_layout: &VertexLayout::default(),
                blend_state: &BlendState::default(),
                depth_state: &DepthState::default(),
                rasterizer_state: &RasterizerState::default(),
                color_formats: &[Format::R8G8B8A8_UNORM],
                depth_stencil_format: None,
                sample_count: SampleCount::SampleCount1,
                primitive_topology: PrimitiveTopology::TriangleList,
            })
            .unwrap();

        Fixture {
            layout,
            pipeline_layout,
            pipeline,
        }
    }

    fn recording_command_buffer(device_context: &DeviceContext) -> CommandBuffer {
        let queue = device_context.create_queue(QueueType::Graphics).unwrap();
        let mut command_buffer = queue
            .create_command_buffer(&CommandBufferDef::default())
            .unwrap();
        command_buffer.begin().unwrap();
        command_buffer
    }

    #[test]
    fn repeated_identical_binds_do_not_replay() {
        let api = test_api();
        let device_context = api.device_context();
        let fixture = graphics_fixture(device_context);
        let target = render_target(device_context, SampleCount::SampleCount1);

        let set = device_context.create_descriptor_set(&fixture.layout);
        let buffer = device_context
            .create_buffer(&BufferDef {
                size: 256,
                usage_flags: ResourceUsage::AS_CONST_BUFFER,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap();
        set.set_buffer(0, &buffer);

        let mut cmd = recording_command_buffer(device_context);
        cmd.cmd_bind_render_targets(&[color_binding(&target)], None);
        cmd.cmd_bind_pipeline(&fixture.pipeline);
        cmd.cmd_bind_descriptor_set(&set);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.descriptor_replay_count(), 1);

        // identical re-binds raise no dirty bits
        cmd.cmd_bind_pipeline(&fixture.pipeline);
        cmd.cmd_bind_descriptor_set(&set);
        assert!(cmd.graphics_dirty.is_empty());
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.descriptor_replay_count(), 1);

        // mutating the set bumps its version; the next bind re-replays
        set.set_buffer(0, &buffer);
        cmd.cmd_bind_descriptor_set(&set);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.descriptor_replay_count(), 2);

        cmd.end().unwrap();
    }

    #[test]
    fn rebinding_identical_targets_keeps_the_pass_open() {
        let api = test_api();
        let device_context = api.device_context();
        let fixture = graphics_fixture(device_context);
        let target = render_target(device_context, SampleCount::SampleCount1);

        let set = device_context.create_descriptor_set(&fixture.layout);
        let buffer = device_context
            .create_buffer(&BufferDef {
                size: 64,
                usage_flags: ResourceUsage::AS_CONST_BUFFER,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap();
        set.set_buffer(0, &buffer);

        let mut cmd = recording_command_buffer(device_context);
        cmd.cmd_bind_render_targets(&[color_binding(&target)], None);
        cmd.cmd_bind_pipeline(&fixture.pipeline);
        cmd.cmd_bind_descriptor_set(&set);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 1);

        // unbind, then rebind the exact same attachment set
        cmd.cmd_bind_render_targets(&[], None);
        cmd.cmd_bind_render_targets(&[color_binding(&target)], None);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 1);

        // a different attachment forces a fresh pass
        let other = render_target(device_context, SampleCount::SampleCount1);
        cmd.cmd_bind_render_targets(&[color_binding(&other)], None);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 2);

        cmd.end().unwrap();
    }

    #[test]
    fn sample_count_change_forces_a_new_pass() {
        let api = test_api();
        let device_context = api.device_context();
        let fixture = graphics_fixture(device_context);
        let single = render_target(device_context, SampleCount::SampleCount1);
        let msaa = render_target(device_context, SampleCount::SampleCount4);

        let set = device_context.create_descriptor_set(&fixture.layout);
        let buffer = device_context
            .create_buffer(&BufferDef {
                size: 64,
                usage_flags: ResourceUsage::AS_CONST_BUFFER,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap();
        set.set_buffer(0, &buffer);

        let mut cmd = recording_command_buffer(device_context);
        cmd.cmd_bind_render_targets(&[color_binding(&single)], None);
        cmd.cmd_bind_pipeline(&fixture.pipeline);
        cmd.cmd_bind_descriptor_set(&set);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 1);

        cmd.cmd_bind_render_targets(&[color_binding(&msaa)], None);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 2);

        cmd.end().unwrap();
    }

    #[test]
    fn clear_is_transparent_to_dirty_state() {
        let api = test_api();
        let device_context = api.device_context();
        let fixture = graphics_fixture(device_context);
        let target = render_target(device_context, SampleCount::SampleCount1);

        let set = device_context.create_descriptor_set(&fixture.layout);
        let buffer = device_context
            .create_buffer(&BufferDef {
                size: 64,
                usage_flags: ResourceUsage::AS_CONST_BUFFER,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap();
        set.set_buffer(0, &buffer);

        let mut cmd = recording_command_buffer(device_context);
        cmd.cmd_bind_render_targets(&[color_binding(&target)], None);
        cmd.cmd_bind_pipeline(&fixture.pipeline);
        cmd.cmd_bind_descriptor_set(&set);
        cmd.cmd_draw(3, 0).unwrap();
        assert!(cmd.graphics_dirty.is_empty());

        // leave some state pending, then clear
        cmd.cmd_set_scissors(&[ScissorRect {
            x: 0,
            y: 0,
            width: 32,
            height: 32,
        }]);
        cmd.cmd_push_constants(&fixture.pipeline_layout, 0, &[7u8; 16]);
        let before = cmd.graphics_dirty;
        assert!(before.intersects(GraphicsDirtyFlags::SCISSORS));
        assert!(before.intersects(GraphicsDirtyFlags::PUSH_CONSTANTS));

        cmd.cmd_clear_color(ColorClearValue([0.0, 0.0, 0.0, 1.0])).unwrap();
        assert_eq!(cmd.graphics_dirty, before);

        cmd.end().unwrap();
    }

    #[test]
    fn copies_close_the_render_pass() {
        let api = test_api();
        let device_context = api.device_context();
        let fixture = graphics_fixture(device_context);
        let target = render_target(device_context, SampleCount::SampleCount1);

        let set = device_context.create_descriptor_set(&fixture.layout);
        let cb = device_context
            .create_buffer(&BufferDef {
                size: 64,
                usage_flags: ResourceUsage::AS_CONST_BUFFER,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap();
        set.set_buffer(0, &cb);

        let src = device_context
            .create_buffer(&BufferDef {
                size: 128,
                usage_flags: ResourceUsage::AS_TRANSFERABLE,
                memory_usage: MemoryUsage::CpuToGpu,
            })
            .unwrap();
        let dst = device_context
            .create_buffer(&BufferDef {
                size: 128,
                usage_flags: ResourceUsage::AS_TRANSFERABLE,
                memory_usage: MemoryUsage::GpuOnly,
            })
            .unwrap();

        let mut cmd = recording_command_buffer(device_context);
        cmd.cmd_bind_render_targets(&[color_binding(&target)], None);
        cmd.cmd_bind_pipeline(&fixture.pipeline);
        cmd.cmd_bind_descriptor_set(&set);
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 1);

        cmd.cmd_copy_buffer_to_buffer(
            &src,
            &dst,
            &[BufferCopy {
                src_offset: 0,
                dst_offset: 0,
                size: 128,
            }],
        )
        .unwrap();

        // the blit forced the render encoder closed; drawing again reopens
        cmd.cmd_draw(3, 0).unwrap();
        assert_eq!(cmd.render_pass_count(), 2);

        cmd.end().unwrap();
    }

    #[test]
    fn push_constant_idempotence() {
        let api = test_api();
        let device_context = api.device_context();
        let fixture = graphics_fixture(device_context);

        let mut cmd = recording_command_buffer(device_context);
        cmd.cmd_push_constants(&fixture.pipeline_layout, 0, &[1u8; 16]);
        assert!(cmd
            .graphics_dirty
            .intersects(GraphicsDirtyFlags::PUSH_CONSTANTS));
        cmd.graphics_dirty = GraphicsDirtyFlags::empty();

        // same bytes again: no dirty bit
        cmd.cmd_push_constants(&fixture.pipeline_layout, 0, &[1u8; 16]);
        assert!(cmd.graphics_dirty.is_empty());

        cmd.cmd_push_constants(&fixture.pipeline_layout, 0, &[2u8; 16]);
        assert!(cmd
            .graphics_dirty
            .intersects(GraphicsDirtyFlags::PUSH_CONSTANTS));
        cmd.end().unwrap();
    }

    #[test]
    fn ray_tracing_paths_are_unsupported() {
        let api = test_api();
        let device_context = api.device_context();
        let mut cmd = recording_command_buffer(device_context);
        assert!(matches!(
            cmd.cmd_build_acceleration_structure(),
            Err(GfxError::Unsupported(_))
        ));
        assert!(matches!(
            cmd.cmd_dispatch_rays(),
            Err(GfxError::Unsupported(_))
        ));
        cmd.end().unwrap();
    }
}
