use funcworker_protocol::{InvocationRequest, InvocationResponse, ReturnShape};

use crate::functions::{self, FunctionResult};

pub type FunctionFn = fn(&InvocationRequest, &mut InvocationResponse) -> FunctionResult;

/// Everything the generic invocation handler needs to serve one function.
#[derive(Debug, Clone, Copy)]
pub struct RouteDescriptor {
    /// Path the host posts invocations to (`/<FunctionName>`).
    pub path: &'static str,
    pub function: &'static str,
    /// Name of the trigger binding in `Data`.
    pub trigger: &'static str,
    pub return_shape: ReturnShape,
    pub run: FunctionFn,
}

pub const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        path: "/QueueTrigger",
        function: "QueueTrigger",
        trigger: functions::QUEUE_BINDING,
        return_shape: ReturnShape::Generic,
        run: functions::queue_trigger,
    },
    RouteDescriptor {
        path: "/QueueTriggerWithOutputs",
        function: "QueueTriggerWithOutputs",
        trigger: functions::QUEUE_BINDING,
        return_shape: ReturnShape::Generic,
        run: functions::queue_trigger_with_outputs,
    },
    RouteDescriptor {
        path: "/BlobTrigger",
        function: "BlobTrigger",
        trigger: functions::BLOB_BINDING,
        return_shape: ReturnShape::Generic,
        run: functions::blob_trigger,
    },
    RouteDescriptor {
        path: "/EventHubTrigger",
        function: "EventHubTrigger",
        trigger: functions::EVENT_HUB_BINDING,
        return_shape: ReturnShape::Generic,
        run: functions::event_hub_trigger,
    },
    RouteDescriptor {
        path: "/HttpTriggerWithOutputs",
        function: "HttpTriggerWithOutputs",
        trigger: functions::HTTP_BINDING,
        return_shape: ReturnShape::Generic,
        run: functions::http_trigger_with_outputs,
    },
    RouteDescriptor {
        path: "/HttpTriggerStringReturnValue",
        function: "HttpTriggerStringReturnValue",
        trigger: functions::HTTP_BINDING,
        return_shape: ReturnShape::StringOnly,
        run: functions::http_trigger_string_return,
    },
    RouteDescriptor {
        path: "/TimerTrigger",
        function: "TimerTrigger",
        trigger: functions::TIMER_BINDING,
        return_shape: ReturnShape::Generic,
        run: functions::timer_trigger,
    },
];
