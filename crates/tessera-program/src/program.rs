//! Whole-program metadata and its query surface.
//!
//! A [`ProgramMetadata`] is the in-memory model of one compiled program
//! variant: a preliminary context followed by an ordered sequence of dynamic
//! contexts, plus the per-network bookkeeping the runtime queries (stream
//! and virtual-stream views, canonical output ordering, transfer sizing).
//!
//! Everything here is read-only after assembly; see the crate docs for the
//! publish-once/read-many discipline.

use tracing::{debug, error, warn};

use crate::context::ContextMetadata;
use crate::error::{ProgramError, Result};
use crate::layer::{LayerInfo, StreamDirection};
use crate::views::{NetworkInfo, StreamInfo, TransferSizer, ViewResolver, VstreamInfo};
use tessera_chip::control::{MAX_CONFIG_CHANNELS, NON_DYNAMIC_CONTEXTS_COUNT};

/// Network name that resolves to every network of a program, like an empty
/// request does. Kept for callers built against single-network programs.
pub const DEFAULT_NETWORK_NAME: &str = "default_network";

/// Feature flags the compiler recorded for one program.
///
/// Only `net_flow` changes query behavior in this model; the other flags are
/// carried for the scheduling and data-path layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportedFeatures {
    /// Program is split into more than one dynamic context.
    pub multi_context: bool,

    /// Program carries several independently addressable networks.
    pub multi_network_support: bool,

    /// Preliminary context may run as soon as it is configured.
    pub preliminary_run_asap: bool,

    /// Output virtual streams are enumerated explicitly by the compiler's
    /// post-processing graph instead of being derived from output layers.
    pub net_flow: bool,
}

/// Descriptor of one physical config DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChannelInfo {
    /// DMA engine the channel is wired to.
    pub engine_index: u8,
}

/// Metadata of one compiled program variant.
///
/// Cheap to clone and safe to share across threads once assembly is done;
/// no method mutates state after construction.
#[derive(Debug, Clone)]
pub struct ProgramMetadata {
    name: String,
    preliminary_context: ContextMetadata,
    dynamic_contexts: Vec<ContextMetadata>,
    config_channels_info: Vec<ConfigChannelInfo>,
    sorted_output_names: Vec<String>,
    sorted_network_names: Vec<String>,
    supported_features: SupportedFeatures,
    preresolved_output_vstreams: Vec<VstreamInfo>,
}

impl ProgramMetadata {
    /// Assemble program metadata from its parsed parts.
    ///
    /// `dynamic_contexts` must be in hardware context-switch order;
    /// `sorted_output_names` and `sorted_network_names` are the canonical
    /// orders the compiler emitted.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        preliminary_context: ContextMetadata,
        dynamic_contexts: Vec<ContextMetadata>,
        config_channels_info: Vec<ConfigChannelInfo>,
        sorted_output_names: Vec<String>,
        supported_features: SupportedFeatures,
        sorted_network_names: Vec<String>,
    ) -> Self {
        let name = name.into();

        debug!(
            "program '{}': {} dynamic context(s), {} network(s), {} config channel(s)",
            name,
            dynamic_contexts.len(),
            sorted_network_names.len(),
            config_channels_info.len()
        );
        if config_channels_info.len() > MAX_CONFIG_CHANNELS {
            warn!(
                "program '{}' declares {} config channels, hardware has {}",
                name,
                config_channels_info.len(),
                MAX_CONFIG_CHANNELS
            );
        }

        Self {
            name,
            preliminary_context,
            dynamic_contexts,
            config_channels_info,
            sorted_output_names,
            sorted_network_names,
            supported_features,
            preresolved_output_vstreams: Vec::new(),
        }
    }

    /// Attach the compiler's pre-resolved output virtual streams.
    ///
    /// Only consulted when [`SupportedFeatures::net_flow`] is set, in which
    /// case output-vstream queries return this list verbatim.
    #[must_use]
    pub fn with_output_vstream_infos(mut self, infos: Vec<VstreamInfo>) -> Self {
        self.preresolved_output_vstreams = infos;
        self
    }

    /// Program name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The preliminary context, executed before any dynamic context.
    ///
    /// Boundary edge layers never live here; they exist only in dynamic
    /// contexts.
    #[must_use]
    pub const fn preliminary_context(&self) -> &ContextMetadata {
        &self.preliminary_context
    }

    /// Dynamic contexts in hardware context-switch order.
    #[must_use]
    pub fn dynamic_contexts(&self) -> &[ContextMetadata] {
        &self.dynamic_contexts
    }

    /// Config DMA channel descriptors.
    #[must_use]
    pub fn config_channels_info(&self) -> &[ConfigChannelInfo] {
        &self.config_channels_info
    }

    /// Canonical order of output stream names.
    #[must_use]
    pub fn sorted_output_names(&self) -> &[String] {
        &self.sorted_output_names
    }

    /// Canonical order of network names.
    #[must_use]
    pub fn sorted_network_names(&self) -> &[String] {
        &self.sorted_network_names
    }

    /// Feature flags recorded by the compiler.
    #[must_use]
    pub const fn supported_features(&self) -> &SupportedFeatures {
        &self.supported_features
    }

    /// Scheduled contexts, the non-dynamic slot included.
    #[must_use]
    pub fn contexts_count(&self) -> usize {
        self.dynamic_contexts.len() + NON_DYNAMIC_CONTEXTS_COUNT
    }

    /// The boundary layer carrying `stream_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::LayerNotFound`] if no boundary layer has that
    /// name.
    pub fn layer_by_stream_name(&self, stream_name: &str) -> Result<&LayerInfo> {
        for layer in self.all_layers() {
            if layer.name == stream_name {
                return Ok(layer);
            }
        }
        error!("failed to find layer with name '{stream_name}'");
        Err(ProgramError::LayerNotFound {
            name: stream_name.to_string(),
        })
    }

    /// All boundary input layers, in context order.
    #[must_use]
    pub fn input_layers(&self) -> Vec<&LayerInfo> {
        // Edge layers exist only in the dynamic contexts.
        self.dynamic_contexts
            .iter()
            .flat_map(|context| context.boundary_input_layers())
            .collect()
    }

    /// All boundary output layers, in context order.
    #[must_use]
    pub fn output_layers(&self) -> Vec<&LayerInfo> {
        self.dynamic_contexts
            .iter()
            .flat_map(|context| context.boundary_output_layers())
            .collect()
    }

    /// All boundary layers, inputs before outputs.
    #[must_use]
    pub fn all_layers(&self) -> Vec<&LayerInfo> {
        let mut layers = self.input_layers();
        layers.extend(self.output_layers());
        layers
    }

    fn network_matches(layer: &LayerInfo, network_name: &str) -> bool {
        layer.network_name == network_name
            || network_name.is_empty()
            || network_name == DEFAULT_NETWORK_NAME
    }

    /// Boundary input layers of one network.
    ///
    /// The empty string and [`DEFAULT_NETWORK_NAME`] match every network.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NetworkNotFound`] when nothing matches.
    pub fn network_input_layers(&self, network_name: &str) -> Result<Vec<&LayerInfo>> {
        let layers: Vec<&LayerInfo> = self
            .input_layers()
            .into_iter()
            .filter(|layer| Self::network_matches(layer, network_name))
            .collect();
        if layers.is_empty() {
            error!("network '{network_name}' is not found in networks metadata");
            return Err(ProgramError::NetworkNotFound {
                name: network_name.to_string(),
            });
        }
        Ok(layers)
    }

    /// Boundary output layers of one network; filtering as for
    /// [`Self::network_input_layers`].
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NetworkNotFound`] when nothing matches.
    pub fn network_output_layers(&self, network_name: &str) -> Result<Vec<&LayerInfo>> {
        let layers: Vec<&LayerInfo> = self
            .output_layers()
            .into_iter()
            .filter(|layer| Self::network_matches(layer, network_name))
            .collect();
        if layers.is_empty() {
            error!("network '{network_name}' is not found in networks metadata");
            return Err(ProgramError::NetworkNotFound {
                name: network_name.to_string(),
            });
        }
        Ok(layers)
    }

    /// Boundary layers of one network, inputs before outputs.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NetworkNotFound`] when either direction
    /// matches nothing.
    pub fn network_layers(&self, network_name: &str) -> Result<Vec<&LayerInfo>> {
        let mut layers = self.network_input_layers(network_name)?;
        layers.extend(self.network_output_layers(network_name)?);
        Ok(layers)
    }

    /// Stream descriptors of one network's inputs.
    ///
    /// # Errors
    ///
    /// Propagates the network lookup failure.
    pub fn input_stream_infos(
        &self,
        resolver: &impl ViewResolver,
        network_name: &str,
    ) -> Result<Vec<StreamInfo>> {
        let layers = self.network_input_layers(network_name)?;
        Ok(Self::layers_to_stream_infos(resolver, &layers))
    }

    /// Stream descriptors of one network's outputs.
    ///
    /// # Errors
    ///
    /// Propagates the network lookup failure.
    pub fn output_stream_infos(
        &self,
        resolver: &impl ViewResolver,
        network_name: &str,
    ) -> Result<Vec<StreamInfo>> {
        let layers = self.network_output_layers(network_name)?;
        Ok(Self::layers_to_stream_infos(resolver, &layers))
    }

    /// Stream descriptors of one network, inputs before outputs.
    ///
    /// # Errors
    ///
    /// Propagates the network lookup failure.
    pub fn all_stream_infos(
        &self,
        resolver: &impl ViewResolver,
        network_name: &str,
    ) -> Result<Vec<StreamInfo>> {
        let mut infos = self.input_stream_infos(resolver, network_name)?;
        infos.extend(self.output_stream_infos(resolver, network_name)?);
        Ok(infos)
    }

    /// Virtual-stream descriptors of one network's inputs.
    ///
    /// # Errors
    ///
    /// Propagates the network lookup failure.
    pub fn input_vstream_infos(
        &self,
        resolver: &impl ViewResolver,
        network_name: &str,
    ) -> Result<Vec<VstreamInfo>> {
        let layers = self.network_input_layers(network_name)?;
        Ok(Self::layers_to_vstream_infos(resolver, &layers))
    }

    /// Virtual-stream descriptors of one network's outputs, in canonical
    /// output order.
    ///
    /// Under [`SupportedFeatures::net_flow`] the compiler's pre-resolved list
    /// is returned verbatim, with no network filtering and no reordering.
    ///
    /// # Errors
    ///
    /// Propagates the network lookup failure;
    /// [`ProgramError::NotInSortedOutputs`] if a derived vstream name is
    /// missing from the canonical order.
    pub fn output_vstream_infos(
        &self,
        resolver: &impl ViewResolver,
        network_name: &str,
    ) -> Result<Vec<VstreamInfo>> {
        if self.supported_features.net_flow {
            return Ok(self.preresolved_output_vstreams.clone());
        }

        let layers = self.network_output_layers(network_name)?;
        let infos = Self::layers_to_vstream_infos(resolver, &layers);
        self.sort_by_output_order(infos)
    }

    /// Virtual-stream descriptors of one network, inputs before outputs.
    ///
    /// # Errors
    ///
    /// As for [`Self::input_vstream_infos`] and
    /// [`Self::output_vstream_infos`].
    pub fn all_vstream_infos(
        &self,
        resolver: &impl ViewResolver,
        network_name: &str,
    ) -> Result<Vec<VstreamInfo>> {
        let mut infos = self.input_vstream_infos(resolver, network_name)?;
        infos.extend(self.output_vstream_infos(resolver, network_name)?);
        Ok(infos)
    }

    /// Virtual-stream names the physical stream `stream_name` feeds.
    ///
    /// A defused-NMS fragment resolves to its fused layer's name; a mux
    /// layer to its demux enumeration; any other layer to its own name.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::LayerNotFound`] if no layer has that name,
    /// [`ProgramError::InvalidLayer`] for a fragment without its fused
    /// descriptor.
    pub fn vstream_names_from_stream_name(&self, stream_name: &str) -> Result<Vec<String>> {
        for layer in self.all_layers() {
            if layer.name != stream_name {
                continue;
            }
            if layer.is_defused_nms {
                return Ok(vec![layer.fused_layer()?.name.clone()]);
            }
            if layer.is_mux {
                return Ok(layer
                    .demux_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect());
            }
            return Ok(vec![layer.name.clone()]);
        }
        error!("failed to find stream '{stream_name}'");
        Err(ProgramError::LayerNotFound {
            name: stream_name.to_string(),
        })
    }

    /// Physical stream names feeding the virtual stream `vstream_name`.
    ///
    /// A mux layer contributes its own name when the vstream is one of its
    /// demuxed leaves; a defused-NMS fragment when the vstream is its fused
    /// layer; under [`SupportedFeatures::net_flow`] every device-to-host
    /// layer contributes unconditionally; otherwise an exact name match
    /// contributes.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::VstreamNotFound`] when nothing contributes.
    pub fn stream_names_from_vstream_name(&self, vstream_name: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for layer in self.all_layers() {
            if layer.is_mux {
                if layer.is_edge_under_mux(vstream_name) {
                    names.push(layer.name.clone());
                }
            } else if layer.is_defused_nms {
                if let Some(fused) = layer.fused_nms_layer.as_deref() {
                    if fused.name == vstream_name {
                        names.push(layer.name.clone());
                    }
                }
            } else if self.supported_features.net_flow
                && layer.direction == StreamDirection::DeviceToHost
            {
                names.push(layer.name.clone());
            } else if layer.name == vstream_name {
                names.push(layer.name.clone());
            }
        }
        if names.is_empty() {
            error!("did not find vstream '{vstream_name}'");
            return Err(ProgramError::VstreamNotFound {
                name: vstream_name.to_string(),
            });
        }
        Ok(names)
    }

    /// Fixed-width records for every network, in canonical network order.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NetworkNameTooLong`] if any name does not fit
    /// its record.
    pub fn network_infos(&self) -> Result<Vec<NetworkInfo>> {
        self.sorted_network_names
            .iter()
            .map(|name| NetworkInfo::new(name))
            .collect()
    }

    /// Total bytes the program moves across all dynamic contexts.
    ///
    /// The preliminary context is configuration-only and excluded.
    ///
    /// # Errors
    ///
    /// Propagates the first per-context sizing failure.
    pub fn total_transfer_size(&self, sizer: &impl TransferSizer) -> Result<usize> {
        let mut total = 0;
        for context in &self.dynamic_contexts {
            total += context.transfer_size(sizer)?;
        }
        Ok(total)
    }

    fn layers_to_stream_infos(
        resolver: &impl ViewResolver,
        layers: &[&LayerInfo],
    ) -> Vec<StreamInfo> {
        layers
            .iter()
            .map(|layer| resolver.stream_info(layer))
            .collect()
    }

    fn layers_to_vstream_infos(
        resolver: &impl ViewResolver,
        layers: &[&LayerInfo],
    ) -> Vec<VstreamInfo> {
        let mut infos: Vec<VstreamInfo> = Vec::new();
        for layer in layers {
            for vstream_info in resolver.vstream_infos(layer) {
                // Several defused fragments describe the same fused layer;
                // keep the first descriptor for each vstream name.
                if !infos.iter().any(|existing| existing.name == vstream_info.name) {
                    infos.push(vstream_info);
                }
            }
        }
        infos
    }

    /// Order `infos` by each name's position in the canonical output order.
    /// All indices are resolved before sorting so a missing name fails the
    /// whole operation instead of producing a silently wrong order.
    fn sort_by_output_order(&self, infos: Vec<VstreamInfo>) -> Result<Vec<VstreamInfo>> {
        let mut keyed = Vec::with_capacity(infos.len());
        for info in infos {
            let Some(index) = self
                .sorted_output_names
                .iter()
                .position(|name| *name == info.name)
            else {
                error!("stream '{}' not found in sorted output names", info.name);
                return Err(ProgramError::NotInSortedOutputs { name: info.name });
            };
            keyed.push((index, info));
        }
        keyed.sort_by_key(|(index, _)| *index);
        Ok(keyed.into_iter().map(|(_, info)| info).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EdgeCategory;

    struct NameResolver;

    impl ViewResolver for NameResolver {
        fn stream_info(&self, layer: &LayerInfo) -> StreamInfo {
            StreamInfo {
                name: layer.name.clone(),
                direction: layer.direction,
                hw_frame_size: 512,
            }
        }

        fn vstream_infos(&self, layer: &LayerInfo) -> Vec<VstreamInfo> {
            let name = if layer.is_defused_nms {
                layer.fused_nms_layer.as_deref().map_or_else(
                    || layer.name.clone(),
                    |fused| fused.name.clone(),
                )
            } else {
                layer.name.clone()
            };
            vec![VstreamInfo {
                name,
                network_name: layer.network_name.clone(),
                direction: layer.direction,
            }]
        }
    }

    fn context_with(layers: Vec<LayerInfo>) -> ContextMetadata {
        let mut context = ContextMetadata::default();
        for layer in layers {
            context.add_edge_layer(EdgeCategory::Boundary, layer);
        }
        context
    }

    fn two_network_program() -> ProgramMetadata {
        let context = context_with(vec![
            LayerInfo::new("in_a", StreamDirection::HostToDevice, "net_a"),
            LayerInfo::new("in_b", StreamDirection::HostToDevice, "net_b"),
            LayerInfo::new("out_a", StreamDirection::DeviceToHost, "net_a"),
            LayerInfo::new("out_b", StreamDirection::DeviceToHost, "net_b"),
        ]);
        ProgramMetadata::new(
            "dual",
            ContextMetadata::default(),
            vec![context],
            vec![ConfigChannelInfo { engine_index: 0 }],
            vec!["out_b".into(), "out_a".into()],
            SupportedFeatures::default(),
            vec!["net_a".into(), "net_b".into()],
        )
    }

    #[test]
    fn test_layer_lookup_by_stream_name() {
        let program = two_network_program();
        assert_eq!(program.layer_by_stream_name("out_b").unwrap().name, "out_b");

        let err = program.layer_by_stream_name("missing").unwrap_err();
        assert!(matches!(err, ProgramError::LayerNotFound { .. }));
    }

    #[test]
    fn test_network_filtering() {
        let program = two_network_program();

        let net_a = program.network_input_layers("net_a").unwrap();
        assert_eq!(net_a.len(), 1);
        assert_eq!(net_a[0].name, "in_a");

        // Empty string and the default sentinel match everything.
        assert_eq!(program.network_input_layers("").unwrap().len(), 2);
        assert_eq!(
            program
                .network_output_layers(DEFAULT_NETWORK_NAME)
                .unwrap()
                .len(),
            2
        );

        let err = program.network_input_layers("net_z").unwrap_err();
        assert!(matches!(err, ProgramError::NetworkNotFound { .. }));
    }

    #[test]
    fn test_output_vstreams_follow_canonical_order() {
        let program = two_network_program();
        let infos = program.output_vstream_infos(&NameResolver, "").unwrap();
        let names: Vec<&str> = infos.iter().map(|info| info.name.as_str()).collect();
        assert_eq!(names, vec!["out_b", "out_a"]);
    }

    #[test]
    fn test_output_vstreams_fail_on_name_missing_from_order() {
        let context = context_with(vec![LayerInfo::new(
            "out_unlisted",
            StreamDirection::DeviceToHost,
            "",
        )]);
        let program = ProgramMetadata::new(
            "broken",
            ContextMetadata::default(),
            vec![context],
            Vec::new(),
            vec!["something_else".into()],
            SupportedFeatures::default(),
            Vec::new(),
        );

        let err = program.output_vstream_infos(&NameResolver, "").unwrap_err();
        assert!(matches!(err, ProgramError::NotInSortedOutputs { .. }));
    }

    #[test]
    fn test_net_flow_bypasses_derivation() {
        let features = SupportedFeatures {
            net_flow: true,
            ..SupportedFeatures::default()
        };
        let program = ProgramMetadata::new(
            "flow",
            ContextMetadata::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            features,
            Vec::new(),
        )
        .with_output_vstream_infos(vec![VstreamInfo {
            name: "post_nms".into(),
            network_name: String::new(),
            direction: StreamDirection::DeviceToHost,
        }]);

        // Verbatim: no network filtering, no reordering, no layer scan.
        let infos = program.output_vstream_infos(&NameResolver, "net_z").unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "post_nms");
    }

    #[test]
    fn test_contexts_count_includes_non_dynamic_slot() {
        let program = two_network_program();
        assert_eq!(program.contexts_count(), 2);
    }

    #[test]
    fn test_network_infos_in_canonical_order() {
        let program = two_network_program();
        let infos = program.network_infos().unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name(), "net_a");
        assert_eq!(infos[1].name(), "net_b");
    }
}
