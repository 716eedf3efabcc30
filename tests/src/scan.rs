mod loopback;
mod pipeline;
