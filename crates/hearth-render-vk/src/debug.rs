// SPDX-License-Identifier: CEPL-1.0
use crate::error::{BackendError, VkResultExt};
use ash::ext::debug_utils as ext_debug;
use ash::vk;
use hearth_render::{DiagnosticSink, MessageKind, Severity};
use std::ffi::{c_void, CStr};
use std::sync::Arc;

pub fn severity_from_vk(flags: vk::DebugUtilsMessageSeverityFlagsEXT) -> Severity {
    if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        Severity::Error
    } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        Severity::Warning
    } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        Severity::Info
    } else {
        Severity::Verbose
    }
}

pub fn kind_from_vk(flags: vk::DebugUtilsMessageTypeFlagsEXT) -> MessageKind {
    let mut kind = MessageKind::empty();
    if flags.contains(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL) {
        kind |= MessageKind::GENERAL;
    }
    if flags.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        kind |= MessageKind::VALIDATION;
    }
    if flags.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        kind |= MessageKind::PERFORMANCE;
    }
    if flags.contains(vk::DebugUtilsMessageTypeFlagsEXT::DEVICE_ADDRESS_BINDING) {
        kind |= MessageKind::DEVICE_ADDRESS_BINDING;
    }
    kind
}

/// `user` points at the messenger's boxed `Arc<dyn DiagnosticSink>`.
unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    user: *mut c_void,
) -> vk::Bool32 {
    if data.is_null() || user.is_null() {
        return vk::FALSE;
    }
    let sink = unsafe { &*(user as *const Arc<dyn DiagnosticSink>) };
    let p_message = unsafe { (*data).p_message };
    let message = if p_message.is_null() {
        "".into()
    } else {
        unsafe { CStr::from_ptr(p_message) }.to_string_lossy()
    };
    sink.emit(severity_from_vk(severity), kind_from_vk(types), &message);
    vk::FALSE
}

/// An installed debug-utils messenger and the sink it forwards to.
pub struct DebugMessenger {
    loader: ext_debug::Instance,
    handle: vk::DebugUtilsMessengerEXT,
    // the callback holds a raw pointer into this box
    _sink: Box<Arc<dyn DiagnosticSink>>,
}

impl DebugMessenger {
    /// # Safety
    /// `instance` must have been created with `VK_EXT_debug_utils` enabled and
    /// must outlive the messenger.
    pub unsafe fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, BackendError> {
        let sink = Box::new(sink);
        let ci = vk::DebugUtilsMessengerCreateInfoEXT {
            s_type: vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
            message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            pfn_user_callback: Some(debug_callback),
            p_user_data: &*sink as *const Arc<dyn DiagnosticSink> as *mut c_void,
            ..Default::default()
        };
        let loader = ext_debug::Instance::new(entry, instance);
        let handle = unsafe { loader.create_debug_utils_messenger(&ci, None) }
            .op("create_debug_utils_messenger")?;
        Ok(Self {
            loader,
            handle,
            _sink: sink,
        })
    }

    /// # Safety
    /// Call once, before the owning instance is destroyed.
    pub unsafe fn destroy(&mut self) {
        unsafe {
            self.loader
                .destroy_debug_utils_messenger(self.handle, None)
        };
    }
}
